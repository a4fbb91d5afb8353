use crate::analytics::Percent;
use crate::model::{Amount, Budget, CategoryRef, Entry, EntryType, Month, WithCategory};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// How much of a budget has been spent.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BudgetProgress {
    budget_id: String,
    month: Month,
    category: Option<CategoryRef>,
    limit: Amount,
    spent: Amount,
    /// `limit - spent`. Negative once the budget is exceeded.
    remaining: Amount,
    percent_used: Percent,
    over_budget: bool,
}

impl BudgetProgress {
    pub fn budget_id(&self) -> &str {
        &self.budget_id
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }

    pub fn limit(&self) -> Amount {
        self.limit
    }

    pub fn spent(&self) -> Amount {
        self.spent
    }

    pub fn remaining(&self) -> Amount {
        self.remaining
    }

    pub fn percent_used(&self) -> Percent {
        self.percent_used
    }

    pub fn over_budget(&self) -> bool {
        self.over_budget
    }
}

/// Computes the spent amount of each budget from the expenses of the budgets' month.
///
/// `expenses` must be the month's entries for the same user as `budgets`. Spending is matched to
/// a budget by category id, so entries whose category no longer resolves count toward nothing.
pub fn budget_progress(budgets: &[WithCategory<Budget>], expenses: &[Entry]) -> Vec<BudgetProgress> {
    let mut spent_by_category: HashMap<&str, Decimal> = HashMap::new();
    for entry in expenses {
        if entry.r#type() != EntryType::Expense {
            continue;
        }
        if let Some(category) = entry.category() {
            *spent_by_category.entry(category.id()).or_default() += entry.amount().value();
        }
    }

    budgets
        .iter()
        .map(|row| {
            let budget = row.item();
            let limit = budget.amount().value();
            let spent = spent_by_category
                .get(budget.category_id())
                .copied()
                .unwrap_or_default();
            BudgetProgress {
                budget_id: budget.id().to_string(),
                month: budget.month(),
                category: row.category().cloned(),
                limit: budget.amount(),
                spent: Amount::new(spent),
                remaining: Amount::new(limit - spent),
                percent_used: Percent::of(spent, limit),
                over_budget: spent > limit,
            }
        })
        .collect()
}
