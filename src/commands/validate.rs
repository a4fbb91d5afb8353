//! Checks shared by the insert and update commands.

use crate::error::{ErrorType, IntoResult, Res};
use crate::ledger::Ledger;
use crate::model::{Amount, Category, EntryType};
use crate::Result;
use anyhow::{bail, ensure, Context};

/// Trims `name` and rejects it when nothing is left.
pub(super) fn name(name: &str) -> Res<String> {
    let trimmed = name.trim();
    ensure!(!trimmed.is_empty(), "The name must not be blank");
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub(super) fn optional(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Transaction amounts may be zero but never negative. Returns the amount with storage formatting.
pub(super) fn transaction_amount(amount: Amount) -> Res<Amount> {
    ensure!(
        !amount.is_negative(),
        "The amount {amount} is negative, record money coming in with an income category instead"
    );
    within_bounds(amount)
}

pub(super) fn budget_amount(amount: Amount) -> Res<Amount> {
    ensure!(
        amount.is_positive(),
        "A budget limit must be greater than zero, got {amount}"
    );
    within_bounds(amount)
}

/// Rejects amounts above `Amount::MAX` or with fractions of a cent.
fn within_bounds(amount: Amount) -> Res<Amount> {
    let value = amount.value().normalize();
    ensure!(
        value <= Amount::MAX,
        "The amount {value} is larger than the maximum of {}",
        Amount::new(Amount::MAX)
    );
    ensure!(
        value.scale() <= Amount::MAX_SCALE,
        "The amount {value} has more than {} decimal places",
        Amount::MAX_SCALE
    );
    Ok(Amount::new(value))
}

/// A transaction's type defaults to its category's and must agree with it.
pub(super) fn transaction_type(category: &Category, requested: Option<EntryType>) -> Res<EntryType> {
    match requested {
        None => Ok(category.r#type()),
        Some(t) if t == category.r#type() => Ok(t),
        Some(t) => bail!(
            "The transaction type '{t}' does not match category '{}', which is '{}'",
            category.name(),
            category.r#type()
        ),
    }
}

pub(super) fn budget_category(category: &Category) -> Res<()> {
    ensure!(
        category.r#type() == EntryType::Expense,
        "Budgets can only be set on expense categories, '{}' is an income category",
        category.name()
    );
    Ok(())
}

/// Looks up a category of the ledger's user. Not finding it is a bad request.
pub(super) async fn existing_category(ledger: &Ledger, id: &str) -> Result<Category> {
    ledger
        .store()
        .category(ledger.user(), id)
        .await
        .context("Unable to look up the category")
        .pub_result(ErrorType::Database)?
        .with_context(|| format!("Category {id} does not exist"))
        .pub_result(ErrorType::Request)
}
