//! List command handlers.

use crate::args::{ListBudgetsArgs, ListCategoriesArgs, ListTransactionsArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Budget, Category, Transaction, WithCategory};
use crate::utils::plural;
use crate::{Ledger, Result};

/// The user's categories ordered by name, optionally only income or only expense ones.
pub async fn list_categories(
    ledger: &Ledger,
    args: ListCategoriesArgs,
) -> Result<Out<Vec<Category>>> {
    let categories = ledger
        .store()
        .categories(ledger.user(), args.r#type)
        .await
        .pub_result(ErrorType::DataUnavailable)?;
    let message = format!(
        "Found {} categor{}",
        categories.len(),
        if categories.len() == 1 { "y" } else { "ies" }
    );
    Ok(Out::new(message, categories))
}

/// The user's transactions, newest first, each with its category.
pub async fn list_transactions(
    ledger: &Ledger,
    args: ListTransactionsArgs,
) -> Result<Out<Vec<WithCategory<Transaction>>>> {
    let transactions = ledger
        .store()
        .transactions(ledger.user(), args.limit)
        .await
        .pub_result(ErrorType::DataUnavailable)?;
    let message = format!(
        "Found {} transaction{}",
        transactions.len(),
        plural(transactions.len() as u64, "s")
    );
    Ok(Out::new(message, transactions))
}

/// The user's budgets, most recently created first, optionally only those of one month.
pub async fn list_budgets(
    ledger: &Ledger,
    args: ListBudgetsArgs,
) -> Result<Out<Vec<WithCategory<Budget>>>> {
    let budgets = ledger
        .store()
        .budgets(ledger.user(), args.month)
        .await
        .pub_result(ErrorType::DataUnavailable)?;
    let message = format!(
        "Found {} budget{}",
        budgets.len(),
        plural(budgets.len() as u64, "s")
    );
    Ok(Out::new(message, budgets))
}
