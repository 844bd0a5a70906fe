//! Top-level errors for a report run.
//!
//! Every failure mode a run can hit is a named variant, so the caller has to
//! handle each one explicitly instead of catching an opaque exception. None
//! of these are retried: the first error aborts the traversal, the partial
//! total is discarded, and the session is released before the program
//! reports anything.

use crate::book::BuildError;
use crate::numeric::ConversionError;
use crate::parse;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// The ledger file can't be opened, or its contents don't form a valid
    /// book.
    Session(String),

    /// The reporting currency is missing from the book's commodity table.
    CommodityNotFound(String),

    /// An account path segment didn't resolve. Carries the full original
    /// path, not the suffix that failed.
    AccountNotFound(String),

    /// A ledger rational is not exactly decimal-representable.
    Conversion(String),

    /// A report line couldn't be written.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Session(msg) => write!(f, "can't open ledger session: {}", msg),
            Error::CommodityNotFound(code) => {
                write!(f, "commodity {} is not in the ledger's commodity table", code)
            }
            Error::AccountNotFound(path) => write!(f, "path {} could not be found", path),
            Error::Conversion(msg) => write!(f, "{}", msg),
            Error::Io(msg) => write!(f, "can't write report: {}", msg),
        }
    }
}

impl From<parse::Error> for Error {
    fn from(err: parse::Error) -> Self {
        match err {
            parse::Error::Csv(msg) => Error::Session(format!("malformed ledger file: {}", msg)),
            parse::Error::Format(msg) => Error::Session(format!("invalid ledger record: {}", msg)),
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Session(err.to_string())
    }
}

impl From<ConversionError> for Error {
    fn from(err: ConversionError) -> Self {
        Error::Conversion(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[test]
fn test_display_names_the_failure() {
    for (err, want) in vec![
        (
            Error::AccountNotFound("Assets:Nonexistent".to_string()),
            "path Assets:Nonexistent could not be found",
        ),
        (
            Error::CommodityNotFound("CAD".to_string()),
            "commodity CAD is not in the ledger's commodity table",
        ),
    ] {
        assert_eq!(want, err.to_string());
    }
}
