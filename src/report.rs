//! Balance aggregation over an account subtree.
//!
//! One linear pass: the account itself, then each descendant, each visited
//! exactly once. The first error aborts the traversal and the partial total
//! is discarded, never reported.

use crate::book::{AccountId, Book, CommodityId};
use crate::error::Error;
use crate::numeric;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;

/// The account's own as-of-date balance, converted into the reporting
/// currency, as an exact decimal.
///
/// A balance that isn't strictly positive is nothing to report: the
/// contribution is zero and no line is printed. (Negative balances are
/// deliberately skipped, not negated; the asset framing of this report
/// assumes non-negativity.)
///
/// For a positive balance this writes one line with the converted amount,
/// preceded by a native-quantity line when the account's commodity isn't the
/// reporting currency.
pub fn balance_of(
    book: &Book,
    id: AccountId,
    as_of: NaiveDate,
    currency: CommodityId,
    out: &mut impl Write,
) -> Result<Decimal, Error> {
    let balance = book.balance_as_of(id, as_of)?;
    if !balance.is_positive() {
        return Ok(Decimal::ZERO);
    }

    let account = book.account(id);
    let commodity = match account.commodity {
        Some(commodity) => commodity,
        // A positive balance implies posted splits, which fix a commodity;
        // an account without one has nothing to report.
        None => return Ok(Decimal::ZERO),
    };

    if commodity != currency {
        let native = numeric::to_decimal(balance)?;
        writeln!(
            out,
            "{} balance of shares on {} = {}",
            account.name, as_of, native
        )?;
    }

    let converted_raw = book.convert_to_currency(balance, commodity, currency, as_of)?;
    let converted = numeric::to_decimal(converted_raw)?;
    writeln!(
        out,
        "{} balance on {} = {}${}",
        account.name,
        as_of,
        book.commodity(currency).mnemonic,
        converted
    )?;

    Ok(converted)
}

/// Sum of [`balance_of`] over the account and every descendant.
///
/// Decimal addition is exact, with exponents aligned by the decimal type
/// itself, so the total carries no accumulated error whatever the traversal
/// order.
pub fn total(
    book: &Book,
    id: AccountId,
    as_of: NaiveDate,
    currency: CommodityId,
    out: &mut impl Write,
) -> Result<Decimal, Error> {
    let mut sum = balance_of(book, id, as_of, currency, out)?;

    let descendants = book.descendants(id);
    if !descendants.is_empty() {
        writeln!(out, "\nDescendants of {}:", book.account(id).name)?;
        for descendant in descendants {
            sum += balance_of(book, descendant, as_of, currency, out)?;
        }
    }

    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::resolve::resolve;
    use rust_decimal_macros::dec;

    fn build(data: &str) -> Book {
        Book::build(parse(std::io::Cursor::new(data)).unwrap()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lookup(book: &Book, path: &[&str]) -> AccountId {
        let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        resolve(book, book.root(), &path).unwrap()
    }

    #[test]
    // Root "Assets" with child "Bank" holding exactly 150.25 CAD: the total
    // is 150.25, one balance line, and no shares line since the commodity is
    // already the reporting currency.
    fn test_total_single_currency() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
split,2019-03-20,Assets:Bank,,CAD,,150.25,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();
        let assets = lookup(&book, &["Assets"]);

        let mut out = Vec::new();
        let got = total(&book, assets, date(2019, 3, 24), cad, &mut out).unwrap();

        assert_eq!(dec!(150.25), got);
        let want = "\nDescendants of Assets:\nBank balance on 2019-03-24 = CAD$150.25\n";
        assert_eq!(want, String::from_utf8(out).unwrap());
    }

    #[test]
    // An account holding 10 shares of XYZ priced at 12.34 CAD: the native
    // line shows the share count, the converted line shows 123.40.
    fn test_balance_of_foreign_commodity() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
commodity,,,XYZ Corp,XYZ,,,1
split,2019-03-22,Assets:Broker,,XYZ,,10,
price,2019-03-23,,,XYZ,CAD,12.34,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();
        let broker = lookup(&book, &["Assets", "Broker"]);

        let mut out = Vec::new();
        let got = balance_of(&book, broker, date(2019, 3, 24), cad, &mut out).unwrap();

        assert_eq!(dec!(123.40), got);
        let want = "Broker balance of shares on 2019-03-24 = 10\n\
                    Broker balance on 2019-03-24 = CAD$123.40\n";
        assert_eq!(want, String::from_utf8(out).unwrap());
    }

    #[test]
    // Zero and negative balances contribute exactly zero and print nothing.
    fn test_balance_of_suppresses_non_positive() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
split,2019-03-20,Assets:Overdrawn,,CAD,,-35.00,
split,2019-03-20,Assets:Empty,,CAD,,20.00,
split,2019-03-21,Assets:Empty,,CAD,,-20.00,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();

        for path in vec![vec!["Assets", "Overdrawn"], vec!["Assets", "Empty"]] {
            let id = lookup(&book, &path);
            let mut out = Vec::new();
            let got = balance_of(&book, id, date(2019, 3, 24), cad, &mut out).unwrap();

            assert_eq!(Decimal::ZERO, got);
            assert!(out.is_empty(), "no line expected for {:?}", path);
        }
    }

    #[test]
    // total(A) must equal balance_of(A) plus the balance_of of every
    // descendant, summed in any order.
    fn test_total_is_additive() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
commodity,,,XYZ Corp,XYZ,,,1
split,2019-03-19,Assets,,CAD,,5.00,
split,2019-03-20,Assets:Bank,,CAD,,150.25,
split,2019-03-21,Assets:Bank:Savings,,CAD,,1000.00,
split,2019-03-22,Assets:Broker,,XYZ,,10,
split,2019-03-22,Assets:Overdrawn,,CAD,,-3.50,
price,2019-03-23,,,XYZ,CAD,12.34,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();
        let as_of = date(2019, 3, 24);
        let assets = lookup(&book, &["Assets"]);

        let mut sink = std::io::sink();
        let got = total(&book, assets, as_of, cad, &mut sink).unwrap();

        let mut by_hand = balance_of(&book, assets, as_of, cad, &mut sink).unwrap();
        for descendant in book.descendants(assets) {
            by_hand += balance_of(&book, descendant, as_of, cad, &mut sink).unwrap();
        }

        assert_eq!(by_hand, got);
        assert_eq!(dec!(1278.65), got);
    }

    #[test]
    // A leaf account prints no descendants header.
    fn test_total_of_leaf_has_no_header() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
split,2019-03-20,Assets:Bank,,CAD,,150.25,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();
        let bank = lookup(&book, &["Assets", "Bank"]);

        let mut out = Vec::new();
        let got = total(&book, bank, date(2019, 3, 24), cad, &mut out).unwrap();

        assert_eq!(dec!(150.25), got);
        let want = "Bank balance on 2019-03-24 = CAD$150.25\n";
        assert_eq!(want, String::from_utf8(out).unwrap());
    }

    #[test]
    // A foreign-commodity balance with no price on file converts to zero,
    // matching the pricedb behaviour of the underlying ledger engine.
    fn test_total_without_price_values_at_zero() {
        let book = build(
            r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
commodity,,,XYZ Corp,XYZ,,,1
split,2019-03-22,Assets:Broker,,XYZ,,10,"#,
        );
        let cad = book.find_commodity("CAD").unwrap();
        let broker = lookup(&book, &["Assets", "Broker"]);

        let mut out = Vec::new();
        let got = balance_of(&book, broker, date(2019, 3, 24), cad, &mut out).unwrap();

        assert_eq!(Decimal::ZERO, got);
        let want = "Broker balance of shares on 2019-03-24 = 10\n\
                    Broker balance on 2019-03-24 = CAD$0.00\n";
        assert_eq!(want, String::from_utf8(out).unwrap());
    }
}
