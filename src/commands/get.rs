//! Get command handlers, one row by id.

use crate::args::IdArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Budget, Category, Transaction, WithCategory};
use crate::{Ledger, Result};
use anyhow::Context;

pub async fn get_category(ledger: &Ledger, args: IdArgs) -> Result<Out<Category>> {
    let category = ledger
        .store()
        .category(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::DataUnavailable)?
        .with_context(|| format!("Category {} does not exist", args.id))
        .pub_result(ErrorType::Request)?;
    Ok(Out::new(format!("Found category {}", args.id), category))
}

pub async fn get_transaction(
    ledger: &Ledger,
    args: IdArgs,
) -> Result<Out<WithCategory<Transaction>>> {
    let transaction = ledger
        .store()
        .transaction(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::DataUnavailable)?
        .with_context(|| format!("Transaction {} does not exist", args.id))
        .pub_result(ErrorType::Request)?;
    Ok(Out::new(
        format!("Found transaction {}", args.id),
        transaction,
    ))
}

pub async fn get_budget(ledger: &Ledger, args: IdArgs) -> Result<Out<WithCategory<Budget>>> {
    let budget = ledger
        .store()
        .budget(ledger.user(), &args.id)
        .await
        .pub_result(ErrorType::DataUnavailable)?
        .with_context(|| format!("Budget {} does not exist", args.id))
        .pub_result(ErrorType::Request)?;
    Ok(Out::new(format!("Found budget {}", args.id), budget))
}
