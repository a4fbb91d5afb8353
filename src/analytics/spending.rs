use crate::analytics::Percent;
use crate::model::{display_icon, Amount, Entry, EntryType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// The total spent in one category during a month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CategorySpending {
    name: String,
    icon: String,
    amount: Amount,
}

impl CategorySpending {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Groups expense entries by category name and sums each group, largest first.
///
/// - Groups with equal totals keep the order in which their category first appeared.
/// - Entries whose category no longer resolves are left out.
/// - Income entries are left out.
/// - A group's icon comes from its first entry, falling back to `DEFAULT_ICON`.
pub fn category_breakdown<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<CategorySpending> {
    let mut groups: Vec<(String, String, Decimal)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for entry in entries {
        if entry.r#type() != EntryType::Expense {
            continue;
        }
        let Some(category) = entry.category() else {
            skipped += 1;
            continue;
        };
        match index.get(category.name()).copied() {
            Some(ix) => groups[ix].2 += entry.amount().value(),
            None => {
                index.insert(category.name().to_string(), groups.len());
                groups.push((
                    category.name().to_string(),
                    display_icon(category.icon()).to_string(),
                    entry.amount().value(),
                ));
            }
        }
    }
    if skipped > 0 {
        trace!("Left {skipped} uncategorized expenses out of the spending breakdown");
    }

    // `sort_by` is stable, so ties stay in first-appearance order.
    groups.sort_by(|a, b| b.2.cmp(&a.2));
    groups
        .into_iter()
        .map(|(name, icon, amount)| CategorySpending {
            name,
            icon,
            amount: Amount::new(amount),
        })
        .collect()
}

/// A category's spending together with its share of the month's total expenses.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SpendingShare {
    #[serde(flatten)]
    spending: CategorySpending,
    percent: Percent,
}

impl SpendingShare {
    pub fn spending(&self) -> &CategorySpending {
        &self.spending
    }

    pub fn percent(&self) -> Percent {
        self.percent
    }
}

/// Attaches each category's share of `total_expenses` to a breakdown.
pub fn spending_shares(breakdown: Vec<CategorySpending>, total_expenses: Amount) -> Vec<SpendingShare> {
    breakdown
        .into_iter()
        .map(|spending| {
            let percent = Percent::of(spending.amount.value(), total_expenses.value());
            SpendingShare { spending, percent }
        })
        .collect()
}
