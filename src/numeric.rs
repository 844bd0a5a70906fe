//! Exact numeric types for ledger quantities.
//!
//! The ledger stores every quantity as an exact rational (numerator over a
//! positive denominator). Reports want decimals. The conversion between the
//! two must be exact: no rounding, and no binary floating-point intermediate
//! anywhere.

use rust_decimal::Decimal;
use std::fmt;

/// An exact fraction, as handed out by the ledger store.
///
/// The denominator is always positive; the sign lives on the numerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    num: i128,
    denom: i128,
}

impl Rational {
    /// Build a rational. A negative denominator is folded into the numerator,
    /// so the positive-denominator invariant always holds.
    pub fn new(num: i128, denom: i128) -> Self {
        assert!(denom != 0, "rational with zero denominator");
        if denom < 0 {
            Self { num: -num, denom: -denom }
        } else {
            Self { num, denom }
        }
    }

    pub fn zero() -> Self {
        Self { num: 0, denom: 1 }
    }

    /// Exact conversion from a decimal: the mantissa over 10^scale.
    pub fn from_decimal(value: Decimal) -> Self {
        Self::new(value.mantissa(), 10i128.pow(value.scale()))
    }

    pub fn num(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.denom
    }

    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Exact addition. Overflowing 128 bits is an error, never a wrapped or
    /// panicking sum.
    ///
    /// The result keeps the lcm of both denominators instead of reducing to
    /// lowest terms. Balances are denominated in power-of-10 fractions, and
    /// reducing would destroy that: 1/10 + 1/10 reduced is 1/5, which is no
    /// longer decimal-representable even though 0.2 obviously is.
    pub fn add(self, other: Rational) -> Result<Rational, ConversionError> {
        let gcd = gcd(self.denom, other.denom);
        let denom = (self.denom / gcd)
            .checked_mul(other.denom)
            .ok_or(ConversionError::ArithmeticOverflow)?;
        let left = self
            .num
            .checked_mul(denom / self.denom)
            .ok_or(ConversionError::ArithmeticOverflow)?;
        let right = other
            .num
            .checked_mul(denom / other.denom)
            .ok_or(ConversionError::ArithmeticOverflow)?;

        Ok(Rational {
            num: left
                .checked_add(right)
                .ok_or(ConversionError::ArithmeticOverflow)?,
            denom,
        })
    }

    /// Exact multiplication, no reduction. Overflow is an error.
    pub fn mul(self, other: Rational) -> Result<Rational, ConversionError> {
        Ok(Rational {
            num: self
                .num
                .checked_mul(other.num)
                .ok_or(ConversionError::ArithmeticOverflow)?,
            denom: self
                .denom
                .checked_mul(other.denom)
                .ok_or(ConversionError::ArithmeticOverflow)?,
        })
    }

    /// Re-express the value over the given denominator, rounding half to even
    /// when it isn't exactly representable.
    ///
    /// This is the one place the store is allowed to round: converting a
    /// balance into a currency lands on that currency's smallest unit, the
    /// same way the original ledger engine snaps converted amounts to the
    /// currency denomination.
    pub fn normalized_to_denom(self, denom: i128) -> Result<Rational, ConversionError> {
        assert!(denom > 0, "target denominator must be positive");
        let scaled = self
            .num
            .checked_mul(denom)
            .ok_or(ConversionError::ArithmeticOverflow)?;
        let quotient = scaled.div_euclid(self.denom);
        let remainder = scaled.rem_euclid(self.denom);

        // remainder is in [0, denom); compare twice the remainder against the
        // denominator to decide the rounding direction.
        let doubled = remainder
            .checked_mul(2)
            .ok_or(ConversionError::ArithmeticOverflow)?;
        let round_up = match doubled.cmp(&self.denom) {
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => quotient % 2 != 0, // tie: round to even
        };

        let num = if round_up {
            quotient
                .checked_add(1)
                .ok_or(ConversionError::ArithmeticOverflow)?
        } else {
            quotient
        };

        Ok(Rational { num, denom })
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// A rational that can't be turned into an exact decimal.
#[derive(Debug, PartialEq)]
pub enum ConversionError {
    /// The denominator is not a power of 10, so the value has no finite
    /// decimal expansion at that scale. It must not be silently truncated.
    NotDecimalRepresentable(Rational),

    /// The value is decimal in nature, but its digits or scale exceed what a
    /// 96-bit decimal can hold exactly.
    OutOfRange(Rational),

    /// An exact operation on rationals overflowed 128 bits. Surfaced as an
    /// error rather than wrapping or panicking, so a sum or conversion can
    /// never silently produce a wrong value.
    ArithmeticOverflow,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConversionError::NotDecimalRepresentable(value) => write!(
                f,
                "rational value {} CAN'T be converted to decimal: denominator {} is not a power of 10",
                value,
                value.denom()
            ),
            ConversionError::OutOfRange(value) => {
                write!(f, "rational value {} does not fit in a decimal", value)
            }
            ConversionError::ArithmeticOverflow => {
                write!(f, "arithmetic overflow during exact rational arithmetic")
            }
        }
    }
}

/// Convert an exact rational into an exact decimal.
///
/// The decimal is sign + digit sequence + base-10 exponent, where the
/// exponent is `log10(denominator)` and must satisfy
/// `10^exponent == denominator` exactly. The digits are the digits of the
/// absolute numerator. The result reproduces the rational's value with zero
/// error, or the conversion fails.
pub fn to_decimal(value: Rational) -> Result<Decimal, ConversionError> {
    let mut exponent: u32 = 0;
    let mut power: i128 = 1;
    while power < value.denom() {
        power = match power.checked_mul(10) {
            Some(power) => power,
            None => return Err(ConversionError::NotDecimalRepresentable(value)),
        };
        exponent += 1;
    }
    if power != value.denom() {
        return Err(ConversionError::NotDecimalRepresentable(value));
    }

    Decimal::try_from_i128_with_scale(value.num(), exponent)
        .map_err(|_| ConversionError::OutOfRange(value))
}

#[test]
// Every n/10^k must come back as the exact same decimal value, for positive
// and negative n alike.
fn test_to_decimal_exact() {
    use rust_decimal_macros::dec;

    for (num, denom, want) in vec![
        (15025, 100, dec!(150.25)),
        (-15025, 100, dec!(-150.25)),
        (10, 1, dec!(10)),
        (0, 1, dec!(0)),
        (1234, 100, dec!(12.34)),
        (5, 1000, dec!(0.005)),
        (-1, 10, dec!(-0.1)),
    ] {
        let got = to_decimal(Rational::new(num, denom)).unwrap();
        assert_eq!(want, got);
    }
}

#[test]
// The scale of the source rational must survive the conversion, so 12340/100
// displays as "123.40" and not "123.4".
fn test_to_decimal_keeps_scale() {
    let got = to_decimal(Rational::new(12340, 100)).unwrap();
    assert_eq!("123.40", got.to_string());
}

#[test]
// A denominator that isn't a power of 10 has no exact decimal form and must
// be rejected, never approximated.
fn test_to_decimal_rejects_non_power_of_ten() {
    for denom in vec![3, 5, 7, 30, 12, 99] {
        let got = to_decimal(Rational::new(1, denom));
        assert_eq!(
            Err(ConversionError::NotDecimalRepresentable(Rational::new(1, denom))),
            got
        );
    }
}

#[test]
// A scale beyond what Decimal can carry is out of range, even though the
// denominator is a legitimate power of 10.
fn test_to_decimal_rejects_oversized_scale() {
    let value = Rational::new(1, 10i128.pow(30));
    assert_eq!(Err(ConversionError::OutOfRange(value)), to_decimal(value));
}

#[test]
// A numerator wider than the 96-bit decimal mantissa is out of range.
fn test_to_decimal_rejects_oversized_numerator() {
    let value = Rational::new(i128::MAX, 1);
    assert_eq!(Err(ConversionError::OutOfRange(value)), to_decimal(value));
}
