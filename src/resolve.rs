//! Account path resolution.

use crate::book::{AccountId, Book};
use crate::error::Error;
use log::debug;

/// Resolve a sequence of account names, starting at `root`, into the single
/// account it designates.
///
/// An iterative walk rather than recursion: the full original path is kept
/// on hand the whole way down, so however deep resolution fails, the error
/// always reports the complete intended path and never just the unresolved
/// suffix.
pub fn resolve(book: &Book, root: AccountId, path: &[String]) -> Result<AccountId, Error> {
    let mut current = root;

    for segment in path {
        current = book
            .child_named(current, segment)
            .ok_or_else(|| Error::AccountNotFound(path.join(":")))?;
        debug!("resolved segment {} -> account {}", segment, current);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn test_book() -> Book {
        let data = r#"type,date,account,name,commodity,currency,quantity,fraction
commodity,,,Canadian Dollar,CAD,,,100
split,2019-03-20,Assets:Bank:Chequing,,CAD,,150.25,
split,2019-03-20,Assets:Bank:Savings,,CAD,,1000.00,"#;
        Book::build(parse(std::io::Cursor::new(data)).unwrap()).unwrap()
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_ok() {
        let book = test_book();

        let got = resolve(&book, book.root(), &path(&["Assets", "Bank", "Chequing"])).unwrap();
        assert_eq!("Chequing", book.account(got).name);
    }

    #[test]
    // Resolving the same path twice against an unchanged book must land on
    // the same account.
    fn test_resolve_is_deterministic() {
        let book = test_book();
        let p = path(&["Assets", "Bank", "Savings"]);

        let first = resolve(&book, book.root(), &p).unwrap();
        let second = resolve(&book, book.root(), &p).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    // A failure on the second segment must still report the full original
    // path, not the remaining suffix.
    fn test_resolve_reports_full_original_path() {
        let book = test_book();

        let got = resolve(&book, book.root(), &path(&["Assets", "Nonexistent"]));
        assert_eq!(
            Err(Error::AccountNotFound("Assets:Nonexistent".to_string())),
            got
        );

        // Deeper failure, same rule.
        let got = resolve(&book, book.root(), &path(&["Assets", "Bank", "Nope"]));
        assert_eq!(
            Err(Error::AccountNotFound("Assets:Bank:Nope".to_string())),
            got
        );
    }

    #[test]
    // Name matching is exact, not case-insensitive.
    fn test_resolve_is_case_sensitive() {
        let book = test_book();

        let got = resolve(&book, book.root(), &path(&["assets"]));
        assert_eq!(Err(Error::AccountNotFound("assets".to_string())), got);
    }

    #[test]
    // Resolution can start at any account, not only the root.
    fn test_resolve_relative_to_inner_account() {
        let book = test_book();
        let assets = resolve(&book, book.root(), &path(&["Assets"])).unwrap();

        let got = resolve(&book, assets, &path(&["Bank", "Chequing"])).unwrap();
        assert_eq!("Chequing", book.account(got).name);
    }
}
