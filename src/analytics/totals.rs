use crate::analytics::Percent;
use crate::model::{Amount, Entry, EntryType};
use rust_decimal::Decimal;
use serde::Serialize;

/// Income, expenses and balance for one user's month.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyTotals {
    income: Amount,
    expenses: Amount,
    balance: Amount,
}

impl MonthlyTotals {
    /// Sums `entries` by direction in a single pass. An empty input gives all zeros.
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let (income, expenses) = entries.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), entry| match entry.r#type() {
                EntryType::Income => (income + entry.amount().value(), expenses),
                EntryType::Expense => (income, expenses + entry.amount().value()),
            },
        );
        Self {
            income: Amount::new(income),
            expenses: Amount::new(expenses),
            balance: Amount::new(income - expenses),
        }
    }

    pub fn income(&self) -> Amount {
        self.income
    }

    pub fn expenses(&self) -> Amount {
        self.expenses
    }

    /// `income - expenses`. Negative when the month overspent.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// The share of income that was not spent, or zero when there was no income.
    pub fn savings_rate(&self) -> Percent {
        Percent::of(self.balance.value(), self.income.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{cat, example, expense, income};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_example_month() {
        let totals = MonthlyTotals::compute(&example());
        assert_eq!(totals.income().value(), dec("100"));
        assert_eq!(totals.expenses().value(), dec("75"));
        assert_eq!(totals.balance().value(), dec("25"));
        assert_eq!(totals.savings_rate().value(), dec("25"));
    }

    #[test]
    fn test_empty_is_zero() {
        let totals = MonthlyTotals::compute(&[] as &[Entry]);
        assert_eq!(totals, MonthlyTotals::default());
        assert!(totals.income().is_zero());
        assert!(totals.expenses().is_zero());
        assert!(totals.balance().is_zero());
        assert!(totals.savings_rate().value().is_zero());
    }

    #[test]
    fn test_balance_is_income_minus_expenses() {
        let sets = vec![
            vec![income("0.01"), expense("1999.99", None)],
            vec![expense("3.50", Some(cat("a", "A"))), expense("7", None)],
            vec![income("5000"), income("12.34"), expense("4999.99", None)],
        ];
        for entries in sets {
            let totals = MonthlyTotals::compute(&entries);
            assert_eq!(
                totals.balance().value(),
                totals.income().value() - totals.expenses().value()
            );
        }
    }

    #[test]
    fn test_overspent_month_has_negative_balance() {
        let totals = MonthlyTotals::compute(&[income("10"), expense("25.75", None)]);
        assert!(totals.balance().is_negative());
        assert_eq!(totals.balance().to_string(), "-$15.75");
    }

    #[test]
    fn test_many_small_amounts_do_not_drift() {
        let entries: Vec<Entry> = (0..10_000).map(|_| expense("0.01", None)).collect();
        let totals = MonthlyTotals::compute(&entries);
        assert_eq!(totals.expenses().value(), dec("100"));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let entries = example();
        assert_eq!(
            MonthlyTotals::compute(&entries),
            MonthlyTotals::compute(&entries)
        );
    }

    #[test]
    fn test_serializes_amount_strings() {
        let json = serde_json::to_value(MonthlyTotals::compute(&example())).unwrap();
        assert_eq!(json["income"], "$100.00");
        assert_eq!(json["expenses"], "$75.00");
        assert_eq!(json["balance"], "$25.00");
    }
}
