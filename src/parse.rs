use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, PartialEq)]
pub enum Error {
    Csv(String),    // CSV is malformed
    Format(String), // Data format is incorrect
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Format(err.to_string())
    }
}

// When parsing, I'm making the assumption that we want to completely abort
// on errors: a ledger file with a bad row shouldn't produce a report with a
// silently wrong total. It makes sense to fix the file, then try again.
pub fn parse(input: impl std::io::Read) -> Result<Vec<Entry>, Error> {
    let buffered = std::io::BufReader::new(input);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(buffered);

    reader
        .deserialize::<EntryRecord>()
        .map(|r| match r {
            Ok(record) => Ok(record.try_into()?),
            Err(err) => Err(err.into()),
        })
        .collect()
}

/// One entry of the ledger file, in domain terms.
#[derive(Debug, PartialEq)]
pub enum Entry {
    /// Declares a commodity: a currency or a tradable security.
    Commodity {
        fullname: String,
        mnemonic: String,
        /// Smallest representable unit, as a denominator (100 = cents).
        fraction: i128,
    },

    /// Posts a dated quantity to an account. The account is named by its
    /// path from the root, already split into segments.
    Split {
        date: NaiveDate,
        account: Vec<String>,
        commodity: String,
        quantity: Decimal,
    },

    /// A dated exchange rate: one unit of `commodity`, quoted in `currency`.
    Price {
        date: NaiveDate,
        commodity: String,
        currency: String,
        rate: Decimal,
    },
}

// I have an EntryRecord type because I can't directly deserialise into my
// "domain" type, i.e. Entry.
// See https://github.com/BurntSushi/rust-csv/issues/211.
//
// Every column except `type` is optional at the CSV level; which ones are
// actually required depends on the record type, and TryFrom enforces that.
#[derive(Debug, Deserialize)]
struct EntryRecord {
    #[serde(rename = "type")]
    entry_type: EntryRecordType,

    date: Option<NaiveDate>,

    /// Colon-separated account path, e.g. `Assets:Bank:Chequing`.
    account: Option<String>,

    /// Commodity full name (only for `commodity` records).
    name: Option<String>,

    /// Commodity mnemonic code.
    commodity: Option<String>,

    /// Quote currency mnemonic (only for `price` records).
    currency: Option<String>,

    /// Split quantity, or price rate.
    quantity: Option<Decimal>,

    /// Commodity fraction (only for `commodity` records).
    fraction: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EntryRecordType {
    Commodity,
    Split,
    Price,
}

impl TryFrom<EntryRecord> for Entry {
    type Error = &'static str;
    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        match record.entry_type {
            EntryRecordType::Commodity => Ok(Entry::Commodity {
                fullname: record.name.ok_or("missing name for commodity")?,
                mnemonic: record.commodity.ok_or("missing commodity code for commodity")?,
                fraction: i128::from(record.fraction.ok_or("missing fraction for commodity")?),
            }),
            EntryRecordType::Split => Ok(Entry::Split {
                date: record.date.ok_or("missing date for split")?,
                account: split_account_path(record.account.ok_or("missing account for split")?)?,
                commodity: record.commodity.ok_or("missing commodity for split")?,
                quantity: record.quantity.ok_or("missing quantity for split")?,
            }),
            EntryRecordType::Price => Ok(Entry::Price {
                date: record.date.ok_or("missing date for price")?,
                commodity: record.commodity.ok_or("missing commodity for price")?,
                currency: record.currency.ok_or("missing currency for price")?,
                rate: record.quantity.ok_or("missing quantity for price")?,
            }),
        }
    }
}

fn split_account_path(path: String) -> Result<Vec<String>, &'static str> {
    let segments: Vec<String> = path.split(':').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err("empty segment in account path");
    }
    Ok(segments)
}

#[test]
// Parsing well-formed data should return a vector of Entry.
fn test_parse_ok() {
    let data = r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
commodity,,,XYZ Corp,XYZ,,,1
split,2019-03-20,Assets:Bank,,CAD,,150.25,
price,2019-03-24,,,XYZ,CAD,12.34,"#;
    let reader = std::io::Cursor::new(data);
    let entries = parse(reader).expect("parsing should succeed");
    assert_eq!(4, entries.len());
}

#[test]
fn test_parse_ok_with_whitespace() {
    let data = r#"type,   date,       account,    name,commodity,currency,quantity,fraction
commodity, ,     ,   Canadian Dollar,  CAD , , , 100
split ,  2019-03-20 , Assets:Bank ,, CAD ,, 150.25 ,"#;
    let reader = std::io::Cursor::new(data);
    let entries = parse(reader).expect("parsing should succeed");
    assert_eq!(2, entries.len());
}

#[test]
// Parsing incorrectly formatted data should return an Err.
fn test_parse_invalid_format() {
    for (data, err_contains) in vec![
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
some_unknown_entry_type,2019-03-20,Assets,,CAD,,1.0,"#,
            "unknown variant `some_unknown_entry_type`",
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
split,2019-03-20,Assets,,CAD,,1.0"#,
            "found record with 7 fields, but the previous record has 8 fields",
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
split,2019-03-20,Assets,,CAD,,1.0,,,"#,
            "found record with 10 fields, but the previous record has 8 fields",
        ),
    ] {
        let reader = std::io::Cursor::new(data);
        let got_err = parse(reader);
        assert!(got_err.is_err());

        let err = got_err.err().unwrap();
        match err {
            Error::Csv(msg) => assert!(msg.contains(err_contains), "{:?}", msg),
            Error::Format(_) => panic!("unexpected error"),
        }
    }
}

#[test]
// Records missing a column their type requires should fail to convert into
// an Entry.
fn test_parse_invalid_data() {
    for (data, want_err) in vec![
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
split,,Assets:Bank,,CAD,,150.25,"#,
            Error::Format("missing date for split".to_string()),
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
split,2019-03-20,Assets:Bank,,CAD,,,"#,
            Error::Format("missing quantity for split".to_string()),
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,,,,100"#,
            Error::Format("missing commodity code for commodity".to_string()),
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
price,2019-03-24,,,XYZ,,12.34,"#,
            Error::Format("missing currency for price".to_string()),
        ),
        (
            r#"type,date,account,name,commodity,currency,quantity,fraction
split,2019-03-20,Assets::Bank,,CAD,,150.25,"#,
            Error::Format("empty segment in account path".to_string()),
        ),
    ] {
        let reader = std::io::Cursor::new(data);
        let got_err = parse(reader);
        assert_eq!(Err(want_err), got_err);
    }
}

#[test]
// When the records are well formed, they should be correctly converted into Entry.
fn test_entry_record_into_entry_well_formed() {
    use rust_decimal_macros::dec;

    let record = EntryRecord {
        entry_type: EntryRecordType::Split,
        date: NaiveDate::from_ymd_opt(2019, 3, 20),
        account: Some("Assets:Bank:Chequing".to_string()),
        name: None,
        commodity: Some("CAD".to_string()),
        currency: None,
        quantity: Some(dec!(150.25)),
        fraction: None,
    };

    let want = Entry::Split {
        date: NaiveDate::from_ymd_opt(2019, 3, 20).unwrap(),
        account: vec![
            "Assets".to_string(),
            "Bank".to_string(),
            "Chequing".to_string(),
        ],
        commodity: "CAD".to_string(),
        quantity: dec!(150.25),
    };

    assert_eq!(want, record.try_into().unwrap());
}
