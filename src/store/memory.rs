//! Implements the `Store` trait using in-memory tables.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a SQLite file.

use crate::error::Res;
use crate::model::{
    Amount, Budget, Category, CategoryRef, Entry, EntryType, Month, Transaction, WithCategory,
};
use crate::store::{CategoryUsage, Store};
use crate::utils;
use anyhow::bail;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// An implementation of the `Store` trait that keeps every row in memory. It mirrors the SQLite
/// schema's constraints: ids are unique, rows must reference an existing category of the same
/// user, and deleting a category deletes what references it.
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
}

impl Tables {
    fn category_ref(&self, user: &str, id: &str) -> Option<CategoryRef> {
        self.categories
            .iter()
            .find(|c| c.user_id == user && c.id == id)
            .map(Category::to_ref)
    }

    fn require_category(&self, user: &str, id: &str) -> Res<()> {
        if self.category_ref(user, id).is_none() {
            bail!("FOREIGN KEY constraint failed: no category {id} for user {user}");
        }
        Ok(())
    }

    fn month_entries(&self, user: &str, month: Month, only: Option<EntryType>) -> Vec<Entry> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user && month.contains(t.date))
            .filter(|t| only.is_none_or(|ty| t.r#type == ty))
            .map(|t| Entry::new(t.amount, t.r#type, self.category_ref(user, &t.category_id)))
            .collect()
    }
}

impl MemoryStore {
    /// A store with no rows at all.
    pub(crate) fn empty() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// A store seeded with categories, three months of transactions ending with the current month,
    /// and budgets for the current month, all owned by `user`.
    pub(crate) fn seeded(user: &str) -> Self {
        Self {
            tables: Mutex::new(seed(user, Month::current())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn categories(&self, user: &str, r#type: Option<EntryType>) -> Res<Vec<Category>> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.user_id == user)
            .filter(|c| r#type.is_none_or(|ty| c.r#type == ty))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category(&self, user: &str, id: &str) -> Res<Option<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.user_id == user && c.id == id)
            .cloned())
    }

    async fn category_usage(&self, user: &str, id: &str) -> Res<CategoryUsage> {
        let tables = self.tables.lock().await;
        let transactions = tables
            .transactions
            .iter()
            .filter(|t| t.user_id == user && t.category_id == id)
            .count();
        let budgets = tables
            .budgets
            .iter()
            .filter(|b| b.user_id == user && b.category_id == id)
            .count();
        Ok(CategoryUsage {
            transactions: transactions as u64,
            budgets: budgets as u64,
        })
    }

    async fn insert_category(&self, category: &Category) -> Res<()> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.id == category.id) {
            bail!("UNIQUE constraint failed: categories.id {}", category.id);
        }
        tables.categories.push(category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        let Some(existing) = tables
            .categories
            .iter_mut()
            .find(|c| c.user_id == category.user_id && c.id == category.id)
        else {
            return Ok(false);
        };
        existing.name = category.name.clone();
        existing.r#type = category.r#type;
        existing.icon = category.icon.clone();
        Ok(true)
    }

    async fn delete_category(&self, user: &str, id: &str) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables
            .categories
            .retain(|c| !(c.user_id == user && c.id == id));
        if tables.categories.len() == before {
            return Ok(false);
        }
        tables
            .transactions
            .retain(|t| !(t.user_id == user && t.category_id == id));
        tables
            .budgets
            .retain(|b| !(b.user_id == user && b.category_id == id));
        Ok(true)
    }

    async fn transactions(
        &self,
        user: &str,
        limit: Option<u32>,
    ) -> Res<Vec<WithCategory<Transaction>>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&Transaction> = tables
            .transactions
            .iter()
            .filter(|t| t.user_id == user)
            .collect();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        let limit = limit
            .filter(|&n| n > 0)
            .map_or(usize::MAX, |n| n as usize);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|t| WithCategory::new(t.clone(), tables.category_ref(user, &t.category_id)))
            .collect())
    }

    async fn transaction(&self, user: &str, id: &str) -> Res<Option<WithCategory<Transaction>>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transactions
            .iter()
            .find(|t| t.user_id == user && t.id == id)
            .map(|t| WithCategory::new(t.clone(), tables.category_ref(user, &t.category_id))))
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Res<()> {
        let mut tables = self.tables.lock().await;
        if tables.transactions.iter().any(|t| t.id == transaction.id) {
            bail!("UNIQUE constraint failed: transactions.id {}", transaction.id);
        }
        tables.require_category(&transaction.user_id, &transaction.category_id)?;
        tables.transactions.push(transaction.clone());
        Ok(())
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        tables.require_category(&transaction.user_id, &transaction.category_id)?;
        let Some(existing) = tables
            .transactions
            .iter_mut()
            .find(|t| t.user_id == transaction.user_id && t.id == transaction.id)
        else {
            return Ok(false);
        };
        existing.category_id = transaction.category_id.clone();
        existing.amount = transaction.amount;
        existing.description = transaction.description.clone();
        existing.date = transaction.date;
        existing.r#type = transaction.r#type;
        Ok(true)
    }

    async fn delete_transaction(&self, user: &str, id: &str) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.transactions.len();
        tables
            .transactions
            .retain(|t| !(t.user_id == user && t.id == id));
        Ok(tables.transactions.len() < before)
    }

    async fn budgets(&self, user: &str, month: Option<Month>) -> Res<Vec<WithCategory<Budget>>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&Budget> = tables
            .budgets
            .iter()
            .filter(|b| b.user_id == user)
            .filter(|b| month.is_none_or(|m| b.month == m))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .map(|b| WithCategory::new(b.clone(), tables.category_ref(user, &b.category_id)))
            .collect())
    }

    async fn budget(&self, user: &str, id: &str) -> Res<Option<WithCategory<Budget>>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .budgets
            .iter()
            .find(|b| b.user_id == user && b.id == id)
            .map(|b| WithCategory::new(b.clone(), tables.category_ref(user, &b.category_id))))
    }

    async fn insert_budget(&self, budget: &Budget) -> Res<()> {
        let mut tables = self.tables.lock().await;
        if tables.budgets.iter().any(|b| b.id == budget.id) {
            bail!("UNIQUE constraint failed: budgets.id {}", budget.id);
        }
        tables.require_category(&budget.user_id, &budget.category_id)?;
        tables.budgets.push(budget.clone());
        Ok(())
    }

    async fn update_budget(&self, budget: &Budget) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        tables.require_category(&budget.user_id, &budget.category_id)?;
        let Some(existing) = tables
            .budgets
            .iter_mut()
            .find(|b| b.user_id == budget.user_id && b.id == budget.id)
        else {
            return Ok(false);
        };
        existing.category_id = budget.category_id.clone();
        existing.amount = budget.amount;
        existing.month = budget.month;
        Ok(true)
    }

    async fn delete_budget(&self, user: &str, id: &str) -> Res<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.budgets.len();
        tables.budgets.retain(|b| !(b.user_id == user && b.id == id));
        Ok(tables.budgets.len() < before)
    }

    async fn month_entries(&self, user: &str, month: Month) -> Res<Vec<Entry>> {
        let tables = self.tables.lock().await;
        Ok(tables.month_entries(user, month, None))
    }

    async fn month_expenses(&self, user: &str, month: Month) -> Res<Vec<Entry>> {
        let tables = self.tables.lock().await;
        Ok(tables.month_entries(user, month, Some(EntryType::Expense)))
    }
}

/// Seed categories: id, name, type and icon.
const SEED_CATEGORIES: &[(&str, &str, EntryType, Option<&str>)] = &[
    ("cat_salary", "Salary", EntryType::Income, Some("💰")),
    ("cat_freelance", "Freelance", EntryType::Income, Some("💻")),
    ("cat_groceries", "Groceries", EntryType::Expense, Some("🛒")),
    ("cat_restaurants", "Restaurants", EntryType::Expense, Some("🍽️")),
    ("cat_transport", "Transport", EntryType::Expense, Some("🚗")),
    ("cat_utilities", "Utilities", EntryType::Expense, Some("💡")),
    ("cat_entertainment", "Entertainment", EntryType::Expense, None),
];

/// Seed transactions repeated in each seeded month: category id, day of month, amount in cents and
/// description.
const SEED_TRANSACTIONS: &[(&str, u32, i64, &str)] = &[
    ("cat_salary", 1, 420_000, "Monthly salary"),
    ("cat_groceries", 3, 8_743, "Whole Foods Market"),
    ("cat_utilities", 5, 14_267, "PG&E Electric"),
    ("cat_restaurants", 7, 4_230, "Olive Garden"),
    ("cat_transport", 9, 5_230, "Shell Gas Station"),
    ("cat_groceries", 12, 6_321, "Trader Joe's"),
    ("cat_freelance", 15, 65_000, "Website project"),
];

/// Seed budgets for the current month: category id and limit in whole dollars.
const SEED_BUDGETS: &[(&str, i64)] = &[
    ("cat_groceries", 400),
    ("cat_restaurants", 30),
    ("cat_utilities", 200),
];

/// How many months of transactions are seeded, ending with the current month.
const SEED_MONTHS: u32 = 3;

fn seed(user: &str, current: Month) -> Tables {
    let categories = SEED_CATEGORIES
        .iter()
        .map(|(id, name, r#type, icon)| Category {
            id: (*id).to_string(),
            user_id: user.to_string(),
            name: (*name).to_string(),
            r#type: *r#type,
            icon: icon.map(str::to_string),
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
        })
        .collect::<Vec<_>>();

    let mut transactions = Vec::new();
    for month in current.trailing(SEED_MONTHS) {
        for (ix, (category_id, day, cents, description)) in SEED_TRANSACTIONS.iter().enumerate() {
            let Some(category) = categories.iter().find(|c| c.id == *category_id) else {
                continue;
            };
            let date = NaiveDate::from_ymd_opt(month.year(), month.month(), *day)
                .unwrap_or_else(|| month.first_day());
            transactions.push(Transaction {
                id: utils::generate_id(),
                user_id: user.to_string(),
                category_id: category.id.clone(),
                amount: Amount::new(Decimal::new(*cents, 2)),
                description: Some((*description).to_string()),
                date,
                r#type: category.r#type,
                created_at: format!("{date}T12:00:{ix:02}.000000Z"),
            });
        }
    }

    let budgets = SEED_BUDGETS
        .iter()
        .enumerate()
        .map(|(ix, (category_id, dollars))| Budget {
            id: utils::generate_id(),
            user_id: user.to_string(),
            category_id: (*category_id).to_string(),
            amount: Amount::new(Decimal::from(*dollars)),
            month: current,
            created_at: format!("{}T00:00:{ix:02}.000000Z", current.first_day()),
        })
        .collect();

    Tables {
        categories,
        transactions,
        budgets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{category_breakdown, MonthlyTotals};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn category(id: &str, user: &str, name: &str, r#type: EntryType) -> Category {
        Category {
            id: id.into(),
            user_id: user.into(),
            name: name.into(),
            r#type,
            icon: None,
            created_at: utils::now(),
        }
    }

    fn transaction(id: &str, category: &Category, amount: &str, date: NaiveDate) -> Transaction {
        Transaction {
            id: id.into(),
            user_id: category.user_id.clone(),
            category_id: category.id.clone(),
            amount: Amount::from_str(amount).unwrap(),
            description: None,
            date,
            r#type: category.r#type,
            created_at: utils::now(),
        }
    }

    #[tokio::test]
    async fn test_seeded_current_month() {
        let store = MemoryStore::seeded("alice");
        let entries = store.month_entries("alice", Month::current()).await.unwrap();
        assert_eq!(entries.len(), SEED_TRANSACTIONS.len());
        let totals = MonthlyTotals::compute(&entries);
        assert_eq!(totals.income().value(), dec("4850"));
        assert_eq!(totals.expenses().value(), dec("387.91"));
        assert_eq!(totals.balance().value(), dec("4462.09"));

        let breakdown = category_breakdown(&entries);
        assert_eq!(breakdown[0].name(), "Groceries");
        assert_eq!(breakdown[0].amount().value(), dec("150.64"));
    }

    #[tokio::test]
    async fn test_seeded_data_belongs_to_one_user() {
        let store = MemoryStore::seeded("alice");
        assert!(store.categories("bob", None).await.unwrap().is_empty());
        assert!(store.transactions("bob", None).await.unwrap().is_empty());
        assert_eq!(store.budgets("alice", None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_month_range_is_inclusive() {
        let store = MemoryStore::empty();
        let food = category("c1", "u1", "Food", EntryType::Expense);
        store.insert_category(&food).await.unwrap();
        for (id, day) in [
            ("t1", "2024-01-31"),
            ("t2", "2024-02-01"),
            ("t3", "2024-02-29"),
            ("t4", "2024-03-01"),
        ] {
            store
                .insert_transaction(&transaction(id, &food, "1", date(day)))
                .await
                .unwrap();
        }
        let feb = Month::new(2024, 2).unwrap();
        assert_eq!(store.month_entries("u1", feb).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_month_expenses_skips_income() {
        let store = MemoryStore::seeded("alice");
        let expenses = store.month_expenses("alice", Month::current()).await.unwrap();
        assert_eq!(expenses.len(), 5);
        assert!(expenses.iter().all(|e| e.r#type() == EntryType::Expense));
    }

    #[tokio::test]
    async fn test_transactions_ordering_and_limit() {
        let store = MemoryStore::empty();
        let food = category("c1", "u1", "Food", EntryType::Expense);
        store.insert_category(&food).await.unwrap();
        store
            .insert_transaction(&transaction("old", &food, "1", date("2025-01-01")))
            .await
            .unwrap();
        for (id, created_at) in [("a", "2025-02-01T08:00:00Z"), ("b", "2025-02-01T09:00:00Z")] {
            let mut t = transaction(id, &food, "1", date("2025-02-01"));
            t.created_at = created_at.into();
            store.insert_transaction(&t).await.unwrap();
        }

        let ids: Vec<String> = store
            .transactions("u1", None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.item().id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a", "old"]);
        assert_eq!(store.transactions("u1", Some(1)).await.unwrap().len(), 1);
        assert_eq!(store.transactions("u1", Some(0)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let store = MemoryStore::seeded("alice");
        assert!(store.delete_category("alice", "cat_groceries").await.unwrap());
        let usage = store
            .category_usage("alice", "cat_groceries")
            .await
            .unwrap();
        assert!(usage.is_unused());
        assert_eq!(store.budgets("alice", None).await.unwrap().len(), 2);
        assert!(!store.delete_category("alice", "cat_groceries").await.unwrap());
    }

    #[tokio::test]
    async fn test_rows_must_reference_own_category() {
        let store = MemoryStore::empty();
        let food = category("c1", "u1", "Food", EntryType::Expense);
        store.insert_category(&food).await.unwrap();
        let mut stolen = transaction("t1", &food, "1", date("2025-01-01"));
        stolen.user_id = "u2".into();
        assert!(store.insert_transaction(&stolen).await.is_err());
    }

    #[tokio::test]
    async fn test_update_is_scoped_to_user() {
        let store = MemoryStore::empty();
        let food = category("c1", "u1", "Food", EntryType::Expense);
        store.insert_category(&food).await.unwrap();
        let mut renamed = food.clone();
        renamed.name = "Groceries".into();
        renamed.user_id = "u2".into();
        assert!(!store.update_category(&renamed).await.unwrap());
        renamed.user_id = "u1".into();
        assert!(store.update_category(&renamed).await.unwrap());
        let read = store.category("u1", "c1").await.unwrap().unwrap();
        assert_eq!(read.name(), "Groceries");
    }
}
