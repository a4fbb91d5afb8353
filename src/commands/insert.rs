//! Insert command handlers.

use crate::args::{InsertBudgetArgs, InsertCategoryArgs, InsertTransactionArgs};
use crate::commands::{validate, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Budget, Category, Month, Transaction, WithCategory};
use crate::utils::{generate_id, now};
use crate::{Ledger, Result};
use chrono::Local;
use tracing::debug;

/// Adds a category for the ledger's user. The generated category is returned on success.
///
/// # Errors
/// - `Request` if the name is blank.
/// - `Database` if the store rejects the write.
pub async fn insert_category(ledger: &Ledger, args: InsertCategoryArgs) -> Result<Out<Category>> {
    let category = Category {
        id: generate_id(),
        user_id: ledger.user().to_string(),
        name: validate::name(&args.name).pub_result(ErrorType::Request)?,
        r#type: args.r#type,
        icon: validate::optional(args.icon),
        created_at: now(),
    };

    ledger
        .store()
        .insert_category(&category)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Inserted {} category '{}' with ID: {}",
        category.r#type(),
        category.name(),
        category.id()
    );
    Ok(Out::new(message, category))
}

/// Records a transaction in one of the user's categories.
///
/// The date defaults to today and the type to the category's type.
///
/// # Errors
/// - `Request` if the category does not exist for the user, the amount is negative or the type
///   disagrees with the category.
/// - `Database` if the store rejects the write.
pub async fn insert_transaction(
    ledger: &Ledger,
    args: InsertTransactionArgs,
) -> Result<Out<WithCategory<Transaction>>> {
    let category = validate::existing_category(ledger, &args.category_id).await?;
    let r#type = validate::transaction_type(&category, args.r#type).pub_result(ErrorType::Request)?;
    let amount = validate::transaction_amount(args.amount).pub_result(ErrorType::Request)?;

    let transaction = Transaction {
        id: generate_id(),
        user_id: ledger.user().to_string(),
        category_id: category.id().to_string(),
        amount,
        description: validate::optional(args.description),
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        r#type,
        created_at: now(),
    };

    ledger
        .store()
        .insert_transaction(&transaction)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("Inserted {transaction:?}");

    let message = format!(
        "Inserted {} of {} in '{}' with ID: {}",
        transaction.r#type(),
        transaction.amount(),
        category.name(),
        transaction.id()
    );
    Ok(Out::new(
        message,
        WithCategory::new(transaction, Some(category.to_ref())),
    ))
}

/// Sets a spending limit on an expense category for a month, the current month by default.
///
/// # Errors
/// - `Request` if the category does not exist for the user, is an income category, or the limit
///   is not greater than zero.
/// - `Database` if the store rejects the write.
pub async fn insert_budget(
    ledger: &Ledger,
    args: InsertBudgetArgs,
) -> Result<Out<WithCategory<Budget>>> {
    let category = validate::existing_category(ledger, &args.category_id).await?;
    validate::budget_category(&category).pub_result(ErrorType::Request)?;
    let amount = validate::budget_amount(args.amount).pub_result(ErrorType::Request)?;

    let budget = Budget {
        id: generate_id(),
        user_id: ledger.user().to_string(),
        category_id: category.id().to_string(),
        amount,
        month: args.month.unwrap_or_else(Month::current),
        created_at: now(),
    };

    ledger
        .store()
        .insert_budget(&budget)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Inserted a budget of {} for '{}' in {} with ID: {}",
        budget.amount(),
        category.name(),
        budget.month(),
        budget.id()
    );
    Ok(Out::new(
        message,
        WithCategory::new(budget, Some(category.to_ref())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, EntryType};
    use crate::test::{TestEnv, TEST_USER};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_insert_category_success() {
        let env = TestEnv::new().await;
        let args = InsertCategoryArgs::new("  Groceries ", EntryType::Expense, Some("🛒".into()));

        let out = insert_category(env.ledger(), args).await.unwrap();

        assert!(out.message().contains("Inserted expense category 'Groceries'"));
        let category = out.structure().unwrap();
        assert_eq!(category.name(), "Groceries");
        assert_eq!(category.user_id(), TEST_USER);
        assert_eq!(category.icon(), Some("🛒"));

        let stored = env
            .ledger()
            .store()
            .category(TEST_USER, category.id())
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), Some(category));
    }

    #[tokio::test]
    async fn test_insert_category_blank_name() {
        let env = TestEnv::new().await;
        let args = InsertCategoryArgs::new(" ", EntryType::Income, None);
        let err = insert_category(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_insert_transaction_defaults_type_from_category() {
        let env = TestEnv::new().await;
        let salary = env.insert_category("Salary", EntryType::Income).await;
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let args = InsertTransactionArgs::new(salary.id(), amount("$4,200.00"), Some(date))
            .with_description("October pay");

        let out = insert_transaction(env.ledger(), args).await.unwrap();

        let row = out.structure().unwrap();
        assert_eq!(row.item().r#type(), EntryType::Income);
        assert_eq!(row.item().amount().value(), amount("4200").value());
        assert_eq!(row.item().description(), Some("October pay"));
        assert_eq!(row.category().unwrap().name(), "Salary");

        let stored = env
            .ledger()
            .store()
            .transaction(TEST_USER, row.item().id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.item().date(), date);
    }

    #[tokio::test]
    async fn test_insert_transaction_defaults_to_today() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let args = InsertTransactionArgs::new(food.id(), amount("3"), None);
        let out = insert_transaction(env.ledger(), args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().item().date(),
            Local::now().date_naive()
        );
    }

    #[tokio::test]
    async fn test_insert_transaction_type_mismatch() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let args = InsertTransactionArgs::new(food.id(), amount("12"), None)
            .with_type(EntryType::Income);
        let err = insert_transaction(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert!(err.to_string().contains("does not match"));
    }

    #[tokio::test]
    async fn test_insert_transaction_negative_amount() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let args = InsertTransactionArgs::new(food.id(), amount("-12"), None);
        let err = insert_transaction(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_insert_transaction_unknown_category() {
        let env = TestEnv::new().await;
        let args = InsertTransactionArgs::new("nope", amount("12"), None);
        let err = insert_transaction(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert!(err.to_string().contains("Category nope does not exist"));
    }

    #[tokio::test]
    async fn test_insert_transaction_other_users_category() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let other = env.ledger_for("someone-else").await;
        let args = InsertTransactionArgs::new(food.id(), amount("12"), None);
        let err = insert_transaction(&other, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_insert_budget_success() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let month = Month::new(2025, 10).unwrap();
        let args = InsertBudgetArgs::new(food.id(), amount("400"), Some(month));

        let out = insert_budget(env.ledger(), args).await.unwrap();

        let row = out.structure().unwrap();
        assert_eq!(row.item().month(), month);
        assert_eq!(row.category().unwrap().id(), food.id());
        let budgets = env
            .ledger()
            .store()
            .budgets(TEST_USER, Some(month))
            .await
            .unwrap();
        assert_eq!(budgets.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_budget_defaults_to_current_month() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        let args = InsertBudgetArgs::new(food.id(), amount("50"), None);
        let out = insert_budget(env.ledger(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().item().month(), Month::current());
    }

    #[tokio::test]
    async fn test_insert_budget_rejects_income_category_and_zero() {
        let env = TestEnv::new().await;
        let salary = env.insert_category("Salary", EntryType::Income).await;
        let food = env.insert_category("Food", EntryType::Expense).await;

        let args = InsertBudgetArgs::new(salary.id(), amount("100"), None);
        let err = insert_budget(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let args = InsertBudgetArgs::new(food.id(), amount("0"), None);
        let err = insert_budget(env.ledger(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }
}
