pub mod account;
pub mod book;
pub mod commodity;

pub use book::{Book, BuildError};

// Using named types doesn't provide any compiler help, but it helps a lot with
// readability.
// Consider the following, when storing an account's children:
// (1) children: Vec<usize>
// (2) children: Vec<AccountId>
// Implementation (1) would most likely need comments, and could be confusing.
// Implementation (2) is self-explanatory.
// Both ids index into the book's arenas and are only meaningful for the book
// that issued them.
pub type AccountId = usize;
pub type CommodityId = usize;
