use super::{AccountId, CommodityId};
use crate::numeric::{ConversionError, Rational};
use chrono::NaiveDate;

/// One node of the account tree.
///
/// The node only knows its own postings; summing a subtree is the report
/// layer's job. That matches the underlying ledger model, where an account's
/// balance never implicitly includes its children.
#[derive(Debug)]
pub struct Account {
    pub name: String,
    pub parent: Option<AccountId>,
    pub children: Vec<AccountId>,

    /// Fixed by the first split posted to this account. Accounts that exist
    /// only as intermediate path segments have no commodity, and a
    /// permanently zero balance.
    pub commodity: Option<CommodityId>,

    pub(super) splits: Vec<Split>,
}

/// A dated quantity posted to an account.
#[derive(Debug)]
pub struct Split {
    pub date: NaiveDate,
    pub amount: Rational,
}

impl Account {
    pub(super) fn new(name: String, parent: Option<AccountId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            commodity: None,
            splits: Vec::new(),
        }
    }

    /// Net balance reflecting every split posted on or before `as_of`,
    /// summed exactly. An overflowing sum is an error, never a wrong value.
    pub fn balance_as_of(&self, as_of: NaiveDate) -> Result<Rational, ConversionError> {
        let mut sum = Rational::zero();
        for split in self.splits.iter().filter(|split| split.date <= as_of) {
            sum = sum.add(split.amount)?;
        }
        Ok(sum)
    }
}
