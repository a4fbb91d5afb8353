//! Delete command handlers.

use crate::args::IdArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::utils::plural;
use crate::{Ledger, Result};
use anyhow::anyhow;
use tracing::debug;

/// Deletes a category together with every transaction and budget that references it.
pub async fn delete_category(ledger: &Ledger, args: IdArgs) -> Result<Out<String>> {
    let usage = ledger
        .store()
        .category_usage(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let deleted = ledger
        .store()
        .delete_category(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?;
    require_deleted(deleted, "Category", &args.id)?;
    debug!("Deleted category {} and its {usage:?}", args.id);

    let message = format!(
        "Deleted category {} along with {} transaction{} and {} budget{}",
        args.id,
        usage.transactions,
        plural(usage.transactions, "s"),
        usage.budgets,
        plural(usage.budgets, "s"),
    );
    Ok(Out::new(message, args.id))
}

pub async fn delete_transaction(ledger: &Ledger, args: IdArgs) -> Result<Out<String>> {
    let deleted = ledger
        .store()
        .delete_transaction(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?;
    require_deleted(deleted, "Transaction", &args.id)?;
    Ok(Out::new(format!("Deleted transaction {}", args.id), args.id))
}

pub async fn delete_budget(ledger: &Ledger, args: IdArgs) -> Result<Out<String>> {
    let deleted = ledger
        .store()
        .delete_budget(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::Database)?;
    require_deleted(deleted, "Budget", &args.id)?;
    Ok(Out::new(format!("Deleted budget {}", args.id), args.id))
}

fn require_deleted(deleted: bool, what: &str, id: &str) -> Result<()> {
    if deleted {
        Ok(())
    } else {
        Err(anyhow!("{what} {id} does not exist")).pub_result(ErrorType::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::InsertBudgetArgs;
    use crate::commands::insert_budget;
    use crate::model::Amount;
    use crate::test::{TestEnv, TEST_USER};
    use std::str::FromStr;

    #[tokio::test]
    async fn test_delete_transaction() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        let id = env.insert_transaction(&data.food, "5", "2025-10-05").await;

        let out = delete_transaction(env.ledger(), IdArgs::new(&id)).await.unwrap();
        assert_eq!(out.structure().unwrap(), &id);
        assert!(env
            .ledger()
            .store()
            .transaction(TEST_USER, &id)
            .await
            .unwrap()
            .is_none());

        let err = delete_transaction(env.ledger(), IdArgs::new(&id))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        insert_budget(
            env.ledger(),
            InsertBudgetArgs::new(
                data.food.id(),
                Amount::from_str("60").unwrap(),
                Some(data.month),
            ),
        )
        .await
        .unwrap();

        let out = delete_category(env.ledger(), IdArgs::new(data.food.id()))
            .await
            .unwrap();

        assert_eq!(
            out.message(),
            format!(
                "Deleted category {} along with 2 transactions and 1 budget",
                data.food.id()
            )
        );
        let store = env.ledger().store();
        assert_eq!(store.transactions(TEST_USER, None).await.unwrap().len(), 2);
        assert!(store.budgets(TEST_USER, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_user() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        let other = env.ledger_for("someone-else").await;
        let err = delete_category(&other, IdArgs::new(data.food.id()))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert!(env
            .ledger()
            .store()
            .category(TEST_USER, data.food.id())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_budget() {
        let env = TestEnv::new().await;
        let err = delete_budget(env.ledger(), IdArgs::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }
}
