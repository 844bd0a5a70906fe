use asset_value::run::report;
use asset_value::session::Session;
use chrono::{Local, NaiveDate};
use std::env;
use std::io;
use std::path::Path;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    // Program name, ledger file, three date components, and at least one
    // account name.
    if args.len() < 6 {
        usage(&mut io::stdout()).expect("can't write to stdout");
        return;
    }

    println!(
        "running asset_value at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let as_of = match parse_date(&args[2], &args[3], &args[4]) {
        Ok(date) => date,
        Err(err) => {
            eprintln!("error: {}", err);
            println!("\n>>> program ended.");
            return;
        }
    };

    let path = args[5..].to_vec();
    println!("finding asset values in {} on {}", args[1], as_of);
    println!("account path = {:?}\n", path);

    // The session releases on drop, on every exit path below.
    match Session::open(Path::new(&args[1])) {
        Ok(session) => match report(session.book(), as_of, &path, &mut io::stdout()) {
            Ok(_total) => {} // the total line is part of the report
            Err(err) => eprintln!("error: {}", err),
        },
        Err(err) => eprintln!("error: {}", err),
    }

    println!("\n>>> program ended.");
}

// Every path out of main, the misuse one included, ends with the same
// closing banner.
fn usage(out: &mut impl io::Write) -> io::Result<()> {
    writeln!(out, "not enough arguments")?;
    writeln!(
        out,
        "usage: asset_value <ledger file> <year> <month> <day> <space-separated path to the account of interest>"
    )?;
    writeln!(out, "\n>>> program ended.")
}

fn parse_date(year: &str, month: &str, day: &str) -> Result<NaiveDate, String> {
    let year: i32 = year
        .parse()
        .map_err(|_| format!("{} is not a valid year", year))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("{} is not a valid month", month))?;
    let day: u32 = day
        .parse()
        .map_err(|_| format!("{} is not a valid day", day))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("{}-{}-{} is not a valid date", year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_ends_with_closing_banner() {
        let mut out = Vec::new();
        usage(&mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("not enough arguments\n"));
        assert!(printed.ends_with("\n>>> program ended.\n"));
    }

    #[test]
    fn test_parse_date_rejects_non_numeric_and_impossible_dates() {
        assert_eq!(
            Err("x is not a valid year".to_string()),
            parse_date("x", "3", "24")
        );
        assert_eq!(
            Err("2019-2-30 is not a valid date".to_string()),
            parse_date("2019", "2", "30")
        );
        assert_eq!(
            Ok(NaiveDate::from_ymd_opt(2019, 3, 24).unwrap()),
            parse_date("2019", "3", "24")
        );
    }
}
