//! Pure reductions of a month's transactions into summary figures.
//!
//! Nothing in this module fetches or filters by date. Callers ask the `Store` for one user's
//! entries in one month (`Month::first_day()..=Month::last_day()`) and hand them over here. None
//! of these functions can fail.

mod progress;
mod spending;
mod totals;
mod trend;

pub use progress::{budget_progress, BudgetProgress};
pub use spending::{category_breakdown, spending_shares, CategorySpending, SpendingShare};
pub use totals::MonthlyTotals;
pub use trend::MonthSummary;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A percentage rounded to one decimal place, e.g. `37.5`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Percent(Decimal);

impl Percent {
    /// `part / whole * 100`, or zero when `whole` is zero or the result is out of range.
    pub fn of(part: Decimal, whole: Decimal) -> Self {
        match part
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|p| p.checked_div(whole))
        {
            Some(p) if !whole.is_zero() => Self(p.round_dp(1)),
            _ => Self(Decimal::ZERO),
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Serialize for Percent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{Amount, CategoryRef, Entry, EntryType};
    use std::str::FromStr;

    pub(crate) fn cat(id: &str, name: &str) -> CategoryRef {
        CategoryRef::new(id, name, EntryType::Expense, None)
    }

    pub(crate) fn income(amount: &str) -> Entry {
        Entry::new(
            Amount::from_str(amount).unwrap(),
            EntryType::Income,
            Some(CategoryRef::new("salary", "Salary", EntryType::Income, None)),
        )
    }

    pub(crate) fn expense(amount: &str, category: Option<CategoryRef>) -> Entry {
        Entry::new(Amount::from_str(amount).unwrap(), EntryType::Expense, category)
    }

    /// The worked example: 100 income, 40 + 10 food, 25 transport.
    pub(crate) fn example() -> Vec<Entry> {
        vec![
            income("100"),
            expense("40", Some(cat("food", "Food"))),
            expense("10", Some(cat("food", "Food"))),
            expense("25", Some(cat("transport", "Transport"))),
        ]
    }
}
