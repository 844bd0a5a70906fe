//! One full report run: resolve the account, total its subtree, print the
//! headline figure.

use crate::book::Book;
use crate::error::Error;
use crate::parse;
use crate::report;
use crate::resolve;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::io::{Read, Write};

/// The single reporting currency every balance is converted into.
/// Resolved against the book's commodity table at the start of each run.
pub const REPORT_CURRENCY: &str = "CAD";

/// Run a report against an already-loaded book.
///
/// Writes one line per positive-balance account in the subtree, then the
/// grand total, and returns the total. On error, nothing after the failure
/// point is written: no partial total.
pub fn report(
    book: &Book,
    as_of: NaiveDate,
    path: &[String],
    out: &mut impl Write,
) -> Result<Decimal, Error> {
    let currency = book
        .find_commodity(REPORT_CURRENCY)
        .ok_or_else(|| Error::CommodityNotFound(REPORT_CURRENCY.to_string()))?;

    let account = resolve::resolve(book, book.root(), path)?;
    debug!(
        "reporting {} as of {} in {}",
        book.account(account).name,
        as_of,
        REPORT_CURRENCY
    );

    let total = report::total(book, account, as_of, currency, out)?;

    writeln!(
        out,
        "total {} value = {}${}",
        book.account(account).name,
        book.commodity(currency).mnemonic,
        total
    )?;

    Ok(total)
}

/// Parse a ledger from `input`, then run a report against it.
pub fn run(
    input: impl Read,
    as_of: NaiveDate,
    path: &[String],
    mut out: impl Write,
) -> Result<Decimal, Error> {
    let book = Book::build(parse::parse(input)?)?;
    report(&book, as_of, path, &mut out)
}
