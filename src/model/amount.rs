//! Amount type for monetary values.
//!
//! `Amount` wraps `Decimal` so that sums over many small transactions never pick up binary
//! floating point error. Parsing accepts an optional dollar sign and thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `-60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    dollar: bool,
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a dollar sign and commas: e.g. `-$60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    dollar: true,
    commas: true,
};

/// A monetary value.
///
/// Stored transaction and budget amounts are never negative; the direction of money is carried by
/// `EntryType`. Computed values, such as a monthly balance, can be negative.
///
/// Formatting is significant for equality, so compare `value()` for numeric comparisons.
///
/// A stored amount is at most `Amount::MAX` with no more than two decimal places. The comma format
/// is exact while the whole-dollar part stays below 2^53 (about nine quadrillion), which sums of
/// stored amounts do in practice.
///
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("1234.5").unwrap();
/// let b = Amount::from_str("$1,234.50").unwrap();
/// assert_eq!(a.value(), b.value());
/// assert_eq!(b.to_string(), "$1,234.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
    format: AmountFormat,
}

impl Amount {
    /// The largest value a transaction or budget may hold: one trillion dollars.
    pub const MAX: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

    /// The most decimal places a stored amount may have.
    pub const MAX_SCALE: u32 = 2;

    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Zero dollars.
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    /// The plain decimal string used for storage, e.g. `1234.50`. No dollar sign or commas.
    pub fn to_plain_string(&self) -> String {
        self.value.normalize().to_string()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount: {}", self.0)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (dollar, digits) = match unsigned.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, unsigned),
        };
        let without_commas = digits.replace(',', "");
        let commas = without_commas.len() < digits.len();

        let mut value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        if negative {
            value.set_sign_negative(true);
        }
        Ok(Amount {
            value,
            format: AmountFormat { dollar, commas },
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self
            .value
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let dol = if self.format.dollar { "$" } else { "" };

        if self.format.commas {
            // Only whole dollars go through f64 so that cents are never lost.
            let dollars = num.trunc();
            let cents = (num.fract() * Decimal::ONE_HUNDRED)
                .to_u64()
                .unwrap_or_default();
            write!(
                f,
                "{sign}{dol}{}.{cents:02}",
                format_num::format_num!(",.0", dollars.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{dol}{num:.2}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts a string such as `"$1,234.50"` or a JSON number.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl serde::de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("an amount such as \"42.50\" or 42.5")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    // Goes through the shortest decimal string so that 0.1 stays 0.1.
    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        self.visit_str(&v.to_string())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
