//! Update command handlers.
//!
//! Updates replace every field of a row except its id, owner and `created_at`. Fields left out of
//! the args are cleared rather than kept.

use crate::args::{UpdateBudgetArgs, UpdateCategoryArgs, UpdateTransactionArgs};
use crate::commands::{validate, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Budget, Category, Transaction, WithCategory};
use crate::{Ledger, Result};
use anyhow::{anyhow, Context};
use tracing::debug;

/// Replaces the name, type and icon of a category.
///
/// The type can only change while no transactions or budgets reference the category.
pub async fn update_category(ledger: &Ledger, args: UpdateCategoryArgs) -> Result<Out<Category>> {
    let existing = validate::existing_category(ledger, &args.id).await?;
    let name = validate::name(&args.name).pub_result(ErrorType::Request)?;

    if existing.r#type() != args.r#type {
        let usage = ledger
            .store()
            .category_usage(ledger.user(), existing.id())
            .await
            .pub_result(ErrorType::Database)?;
        if !usage.is_unused() {
            return Err(anyhow!(
                "Cannot change category '{}' from {} to {}: it is used by {} transactions and {} \
                budgets",
                existing.name(),
                existing.r#type(),
                args.r#type,
                usage.transactions,
                usage.budgets
            ))
            .pub_result(ErrorType::Request);
        }
    }

    let category = Category {
        name,
        r#type: args.r#type,
        icon: validate::optional(args.icon),
        ..existing
    };
    let updated = ledger
        .store()
        .update_category(&category)
        .await
        .pub_result(ErrorType::Database)?;
    ensure_updated(updated, "Category", category.id())?;

    Ok(Out::new(
        format!("Updated category {}", category.id()),
        category,
    ))
}

/// Replaces every field of a transaction, with the same checks as inserting one.
pub async fn update_transaction(
    ledger: &Ledger,
    args: UpdateTransactionArgs,
) -> Result<Out<WithCategory<Transaction>>> {
    let existing = ledger
        .store()
        .transaction(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?
        .with_context(|| format!("Transaction {} does not exist", args.id))
        .pub_result(ErrorType::Request)?
        .into_item();

    let category = validate::existing_category(ledger, &args.category_id).await?;
    let r#type = validate::transaction_type(&category, args.r#type).pub_result(ErrorType::Request)?;
    let amount = validate::transaction_amount(args.amount).pub_result(ErrorType::Request)?;

    let transaction = Transaction {
        category_id: category.id().to_string(),
        amount,
        description: validate::optional(args.description),
        date: args.date,
        r#type,
        ..existing
    };
    let updated = ledger
        .store()
        .update_transaction(&transaction)
        .await
        .pub_result(ErrorType::Database)?;
    ensure_updated(updated, "Transaction", transaction.id())?;
    debug!("Updated {transaction:?}");

    Ok(Out::new(
        format!("Updated transaction {}", transaction.id()),
        WithCategory::new(transaction, Some(category.to_ref())),
    ))
}

/// Replaces the category, limit and month of a budget, with the same checks as inserting one.
pub async fn update_budget(
    ledger: &Ledger,
    args: UpdateBudgetArgs,
) -> Result<Out<WithCategory<Budget>>> {
    let existing = ledger
        .store()
        .budget(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?
        .with_context(|| format!("Budget {} does not exist", args.id))
        .pub_result(ErrorType::Request)?
        .into_item();

    let category = validate::existing_category(ledger, &args.category_id).await?;
    validate::budget_category(&category).pub_result(ErrorType::Request)?;
    let amount = validate::budget_amount(args.amount).pub_result(ErrorType::Request)?;

    let budget = Budget {
        category_id: category.id().to_string(),
        amount,
        month: args.month,
        ..existing
    };
    let updated = ledger
        .store()
        .update_budget(&budget)
        .await
        .pub_result(ErrorType::Database)?;
    ensure_updated(updated, "Budget", budget.id())?;

    Ok(Out::new(
        format!("Updated budget {}", budget.id()),
        WithCategory::new(budget, Some(category.to_ref())),
    ))
}

/// The row was found a moment ago, so losing it now means it was deleted concurrently.
fn ensure_updated(updated: bool, what: &str, id: &str) -> Result<()> {
    if updated {
        Ok(())
    } else {
        Err(anyhow!("{what} {id} no longer exists")).pub_result(ErrorType::Request)
    }
}
