use super::account::{Account, Split};
use super::commodity::Commodity;
use super::{AccountId, CommodityId};
use crate::numeric::{ConversionError, Rational};
use crate::parse::Entry;
use chrono::NaiveDate;
use log::debug;
use std::fmt;

/// The book can't be assembled from the parsed entries.
///
/// These are load-time problems with the ledger file itself, surfaced before
/// any report runs.
#[derive(Debug, PartialEq)]
pub enum BuildError {
    /// Two commodity declarations share a mnemonic.
    DuplicateCommodity(String),

    /// A split or price references a commodity that was never declared.
    UnknownCommodity(String),

    /// An account received splits in two different commodities.
    MixedCommodities {
        account: String,
        expected: String,
        found: String,
    },

    /// A commodity fraction that isn't a power of 10 can never produce
    /// decimal-representable balances.
    BadFraction { mnemonic: String, fraction: i128 },

    /// A split quantity finer than its commodity's declared fraction. Letting
    /// it in would mean rounding it away at conversion time, a silent
    /// truncation of an exactly-stated balance.
    QuantityTooPrecise {
        account: String,
        commodity: String,
        fraction: i128,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::DuplicateCommodity(mnemonic) => {
                write!(f, "commodity {} is declared twice", mnemonic)
            }
            BuildError::UnknownCommodity(mnemonic) => {
                write!(f, "commodity {} is not declared in the ledger", mnemonic)
            }
            BuildError::MixedCommodities {
                account,
                expected,
                found,
            } => write!(
                f,
                "account {} is denominated in {} but received a split in {}",
                account, expected, found
            ),
            BuildError::BadFraction { mnemonic, fraction } => write!(
                f,
                "commodity {} has fraction {}, which is not a power of 10",
                mnemonic, fraction
            ),
            BuildError::QuantityTooPrecise {
                account,
                commodity,
                fraction,
            } => write!(
                f,
                "account {} has a split finer than {}'s fraction of 1/{}",
                account, commodity, fraction
            ),
        }
    }
}

/// A dated exchange rate: one unit of `commodity` is worth `rate` units of
/// `currency`.
#[derive(Debug)]
struct Price {
    date: NaiveDate,
    commodity: CommodityId,
    currency: CommodityId,
    rate: Rational,
}

/// The in-memory, read-only ledger store.
///
/// Accounts live in an arena indexed by `AccountId`, with the root at index
/// 0. The book exposes exactly the capabilities a report run needs: child
/// lookup by name, descendant enumeration, as-of-date balances, commodity
/// lookup, and currency conversion.
pub struct Book {
    accounts: Vec<Account>,
    commodities: Vec<Commodity>,
    prices: Vec<Price>,
}

const ROOT: AccountId = 0;

impl Book {
    /// To build a book, we need the full list of ledger entries.
    /// Accounts are created implicitly from the paths that splits post to.
    pub fn build(entries: Vec<Entry>) -> Result<Self, BuildError> {
        let mut book = Book {
            accounts: vec![Account::new("Root".to_string(), None)],
            commodities: Vec::new(),
            prices: Vec::new(),
        };

        for entry in entries {
            match entry {
                Entry::Commodity {
                    fullname,
                    mnemonic,
                    fraction,
                } => book.add_commodity(fullname, mnemonic, fraction)?,
                Entry::Split {
                    date,
                    account,
                    commodity,
                    quantity,
                } => book.add_split(date, &account, &commodity, Rational::from_decimal(quantity))?,
                Entry::Price {
                    date,
                    commodity,
                    currency,
                    rate,
                } => book.add_price(date, &commodity, &currency, Rational::from_decimal(rate))?,
            }
        }

        debug!(
            "built book: {} accounts, {} commodities, {} prices",
            book.accounts.len(),
            book.commodities.len(),
            book.prices.len()
        );

        Ok(book)
    }

    pub fn root(&self) -> AccountId {
        ROOT
    }

    pub fn account(&self, id: AccountId) -> &Account {
        &self.accounts[id]
    }

    pub fn commodity(&self, id: CommodityId) -> &Commodity {
        &self.commodities[id]
    }

    /// Look up a commodity by its mnemonic code.
    pub fn find_commodity(&self, mnemonic: &str) -> Option<CommodityId> {
        self.commodities
            .iter()
            .position(|commodity| commodity.mnemonic == mnemonic)
    }

    /// Look up a direct child of `id` by exact name.
    pub fn child_named(&self, id: AccountId, name: &str) -> Option<AccountId> {
        self.accounts[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.accounts[child].name == name)
    }

    /// Every account transitively below `id`, excluding `id` itself.
    ///
    /// Preorder, so the listing groups each sub-tree together. The report sum
    /// doesn't depend on this order, but the printed lines do, and they
    /// should be stable from run to run.
    pub fn descendants(&self, id: AccountId) -> Vec<AccountId> {
        let mut result = Vec::new();
        let mut stack: Vec<AccountId> = self.accounts[id].children.iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.accounts[next].children.iter().rev().copied());
        }

        result
    }

    /// The account's own net balance as of a date, as an exact rational.
    pub fn balance_as_of(
        &self,
        id: AccountId,
        as_of: NaiveDate,
    ) -> Result<Rational, ConversionError> {
        self.accounts[id].balance_as_of(as_of)
    }

    /// Convert a balance denominated in `from` into `to`, at the exchange
    /// rate in effect as of `as_of` (the latest price dated on or before it).
    ///
    /// The result is snapped to the target currency's fraction, rounding half
    /// to even when the product isn't exactly representable. With no
    /// applicable price on file there is nothing to value the balance with,
    /// and the converted amount is zero.
    pub fn convert_to_currency(
        &self,
        amount: Rational,
        from: CommodityId,
        to: CommodityId,
        as_of: NaiveDate,
    ) -> Result<Rational, ConversionError> {
        let fraction = self.commodities[to].fraction;

        if from == to {
            return amount.normalized_to_denom(fraction);
        }

        let rate = self
            .prices
            .iter()
            .filter(|price| price.commodity == from && price.currency == to && price.date <= as_of)
            .max_by_key(|price| price.date)
            .map(|price| price.rate);

        match rate {
            Some(rate) => amount.mul(rate)?.normalized_to_denom(fraction),
            // Nothing to value the balance with: zero, at the currency's scale.
            None => Ok(Rational::new(0, fraction)),
        }
    }

    fn add_commodity(
        &mut self,
        fullname: String,
        mnemonic: String,
        fraction: i128,
    ) -> Result<(), BuildError> {
        if self.find_commodity(&mnemonic).is_some() {
            return Err(BuildError::DuplicateCommodity(mnemonic));
        }
        if !is_power_of_ten(fraction) {
            return Err(BuildError::BadFraction { mnemonic, fraction });
        }

        debug!("declared commodity {} ({}), fraction {}", mnemonic, fullname, fraction);
        self.commodities.push(Commodity {
            fullname,
            mnemonic,
            fraction,
        });
        Ok(())
    }

    fn add_split(
        &mut self,
        date: NaiveDate,
        path: &[String],
        commodity: &str,
        amount: Rational,
    ) -> Result<(), BuildError> {
        let commodity_id = self
            .find_commodity(commodity)
            .ok_or_else(|| BuildError::UnknownCommodity(commodity.to_string()))?;

        // The quantity must land on the commodity's smallest unit; both
        // denominators are powers of 10, so divisibility is the exact check.
        // Trailing zeros (150.250 at fraction 100) are still representable.
        let fraction = self.commodities[commodity_id].fraction;
        if amount.denom() > fraction && amount.num() % (amount.denom() / fraction) != 0 {
            return Err(BuildError::QuantityTooPrecise {
                account: path.join(":"),
                commodity: commodity.to_string(),
                fraction,
            });
        }

        let account_id = self.ensure_account(path);

        match self.accounts[account_id].commodity {
            None => self.accounts[account_id].commodity = Some(commodity_id),
            Some(existing) if existing != commodity_id => {
                return Err(BuildError::MixedCommodities {
                    account: path.join(":"),
                    expected: self.commodities[existing].mnemonic.clone(),
                    found: commodity.to_string(),
                });
            }
            Some(_) => {}
        }

        self.accounts[account_id].splits.push(Split { date, amount });
        Ok(())
    }

    fn add_price(
        &mut self,
        date: NaiveDate,
        commodity: &str,
        currency: &str,
        rate: Rational,
    ) -> Result<(), BuildError> {
        let commodity = self
            .find_commodity(commodity)
            .ok_or_else(|| BuildError::UnknownCommodity(commodity.to_string()))?;
        let currency = self
            .find_commodity(currency)
            .ok_or_else(|| BuildError::UnknownCommodity(currency.to_string()))?;

        self.prices.push(Price {
            date,
            commodity,
            currency,
            rate,
        });
        Ok(())
    }

    /// Walk the path from the root, creating any missing account on the way,
    /// and return the final account's id.
    fn ensure_account(&mut self, path: &[String]) -> AccountId {
        let mut current = ROOT;
        for name in path {
            current = match self.child_named(current, name) {
                Some(child) => child,
                None => {
                    let child = self.accounts.len();
                    self.accounts.push(Account::new(name.clone(), Some(current)));
                    self.accounts[current].children.push(child);
                    child
                }
            };
        }
        current
    }
}

fn is_power_of_ten(value: i128) -> bool {
    let mut power: i128 = 1;
    while power < value {
        power = match power.checked_mul(10) {
            Some(power) => power,
            None => return false,
        };
    }
    power == value
}
