//! Read-only session over a ledger file.

use crate::book::Book;
use crate::error::Error;
use crate::parse;
use log::debug;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A scoped, read-only view of a ledger file.
///
/// Opening reads and validates the whole file; the file handle is closed as
/// soon as loading finishes, and the session itself releases on drop. Every
/// exit path (success, resolution failure, conversion failure) goes through
/// the same release, so an aborted report can never leave the ledger file
/// held.
pub struct Session {
    book: Book,
    path: PathBuf,
}

impl Session {
    pub fn open(path: &Path) -> Result<Self, Error> {
        debug!("opening ledger session on {}", path.display());

        let file = File::open(path)
            .map_err(|err| Error::Session(format!("{}: {}", path.display(), err)))?;
        let entries = parse::parse(file)?;
        let book = Book::build(entries)?;

        Ok(Self {
            book,
            path: path.to_path_buf(),
        })
    }

    pub fn book(&self) -> &Book {
        &self.book
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("ledger session on {} ended", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_is_a_session_error() {
        let got = Session::open(Path::new("/nonexistent/ledger.csv"));

        match got {
            Err(Error::Session(msg)) => assert!(msg.contains("/nonexistent/ledger.csv"), "{}", msg),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("unexpected successful open"),
        }
    }
}
