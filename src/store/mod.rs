//! The data-access interface that every command goes through.
//!
//! `Store` is implemented by `Db`, which persists to SQLite, and by `MemoryStore`, which holds
//! seeded data in memory so that the whole app can be run top-to-bottom without a database file.
//! Every read and write is scoped to a single user.

mod memory;

pub(crate) use memory::MemoryStore;

use crate::db::Db;
use crate::error::Res;
use crate::model::{Budget, Category, Entry, EntryType, Month, Transaction, WithCategory};
use crate::Config;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The environment variable that switches the app to the seeded in-memory store.
pub const IN_MEMORY_ENV: &str = "FINTRACK_IN_MEMORY";

/// Which `Store` implementation to use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The SQLite database in the fintrack home directory.
    #[default]
    Sqlite,
    /// Seeded data held in memory. Nothing is persisted.
    Memory,
}

impl Mode {
    /// `Memory` when `FINTRACK_IN_MEMORY` is set to a non-empty value, otherwise `Sqlite`.
    pub fn from_env() -> Self {
        match std::env::var(IN_MEMORY_ENV) {
            Ok(value) if !value.trim().is_empty() => Mode::Memory,
            _ => Mode::Sqlite,
        }
    }
}

/// How many rows point at a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub(crate) struct CategoryUsage {
    pub(crate) transactions: u64,
    pub(crate) budgets: u64,
}

impl CategoryUsage {
    pub(crate) fn is_unused(&self) -> bool {
        self.transactions == 0 && self.budgets == 0
    }
}

/// Reads and writes categories, transactions and budgets for one user at a time.
///
/// Updates are full-field replacements matched on `id` and `user_id`; they return `false` when no
/// such row exists for the user. Deletes behave the same way. Deleting a category also deletes
/// the transactions and budgets that reference it.
#[async_trait::async_trait]
pub(crate) trait Store: Send + Sync {
    /// Categories ordered by name, optionally only those of one type.
    async fn categories(&self, user: &str, r#type: Option<EntryType>) -> Res<Vec<Category>>;

    async fn category(&self, user: &str, id: &str) -> Res<Option<Category>>;

    async fn category_usage(&self, user: &str, id: &str) -> Res<CategoryUsage>;

    async fn insert_category(&self, category: &Category) -> Res<()>;

    async fn update_category(&self, category: &Category) -> Res<bool>;

    async fn delete_category(&self, user: &str, id: &str) -> Res<bool>;

    /// Transactions ordered by date, newest first, then by `created_at`, newest first. A `limit` of
    /// zero is the same as no limit.
    async fn transactions(
        &self,
        user: &str,
        limit: Option<u32>,
    ) -> Res<Vec<WithCategory<Transaction>>>;

    async fn transaction(&self, user: &str, id: &str) -> Res<Option<WithCategory<Transaction>>>;

    async fn insert_transaction(&self, transaction: &Transaction) -> Res<()>;

    async fn update_transaction(&self, transaction: &Transaction) -> Res<bool>;

    async fn delete_transaction(&self, user: &str, id: &str) -> Res<bool>;

    /// Budgets ordered by `created_at`, newest first, optionally only those of one month.
    async fn budgets(&self, user: &str, month: Option<Month>) -> Res<Vec<WithCategory<Budget>>>;

    async fn budget(&self, user: &str, id: &str) -> Res<Option<WithCategory<Budget>>>;

    async fn insert_budget(&self, budget: &Budget) -> Res<()>;

    async fn update_budget(&self, budget: &Budget) -> Res<bool>;

    async fn delete_budget(&self, user: &str, id: &str) -> Res<bool>;

    /// All entries dated from the first through the last day of `month`, inclusive.
    async fn month_entries(&self, user: &str, month: Month) -> Res<Vec<Entry>>;

    /// The expense entries dated within `month`.
    async fn month_expenses(&self, user: &str, month: Month) -> Res<Vec<Entry>>;
}

/// Opens the `Store` for `mode`. In `Memory` mode the store is seeded with data owned by `user`.
pub(crate) async fn open(config: &Config, mode: Mode, user: &str) -> Res<Arc<dyn Store>> {
    match mode {
        Mode::Sqlite => {
            debug!("Opening the SQLite store at {}", config.db_path().display());
            Ok(Arc::new(Db::load(config.db_path()).await?))
        }
        Mode::Memory => {
            debug!("Using a seeded in-memory store for user {user}");
            Ok(Arc::new(MemoryStore::seeded(user)))
        }
    }
}

#[test]
fn test_category_usage() {
    assert!(CategoryUsage::default().is_unused());
    let usage = CategoryUsage {
        transactions: 0,
        budgets: 2,
    };
    assert!(!usage.is_unused());
}
