//! Report the value of an account and all its sub-accounts in a ledger
//! file, as of a given calendar date, converted into the reporting currency.
//!
//! The pipeline is a single straight line: parse the ledger file into a
//! [`book::Book`], resolve the requested account path, then sum the exact
//! as-of-date balances of the account and every descendant, converting each
//! one into the reporting currency along the way. All arithmetic is exact
//! decimal/rational; there is no floating point anywhere.

pub mod book;
pub mod error;
pub mod numeric;
pub mod parse;
pub mod report;
pub mod resolve;
pub mod run;
pub mod session;
