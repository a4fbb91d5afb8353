//! This module is responsible for reading, writing and managing the SQLite database.

mod migrations;

use crate::error::Res;
use crate::model::{
    Amount, Budget, Category, CategoryRef, Entry, EntryType, Month, Transaction, WithCategory,
};
use crate::store::{CategoryUsage, Store};
use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// The `Store` backed by a SQLite file.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool with foreign keys enforced
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!(
                "The database file is missing '{}', run 'fintrack init' first",
                path.display()
            );
        }
        let pool = connect(path, false).await?;
        let version = migrations::schema_version(&pool).await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this app supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    /// Fails with a foreign key message unless `category_id` belongs to `user`.
    async fn require_category(&self, user: &str, category_id: &str) -> Res<()> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = ? AND user_id = ?")
                .bind(category_id)
                .bind(user)
                .fetch_one(&self.pool)
                .await
                .context("Unable to look up category")?;
        if row.0 == 0 {
            bail!("Category {category_id} does not exist");
        }
        Ok(())
    }

    async fn entries(&self, user: &str, month: Month, only: Option<EntryType>) -> Res<Vec<Entry>> {
        let mut sql = format!(
            "{ENTRY_SELECT} WHERE t.user_id = ? AND t.date >= ? AND t.date <= ?"
        );
        if only.is_some() {
            sql.push_str(" AND t.type = ?");
        }
        let mut query = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user)
            .bind(month.first_day().to_string())
            .bind(month.last_day().to_string());
        if let Some(r#type) = only {
            query = query.bind(r#type.to_string());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to fetch transactions for {month}"))?;
        trace!("Fetched {} entries for {month}", rows.len());
        rows.into_iter().map(Entry::try_from).collect()
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at '{}'", path.display()))
}

/// Rewrites constraint violations into messages a user can act on.
fn explain(e: sqlx::Error, what: &str) -> anyhow::Error {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_foreign_key_violation() {
            return anyhow!("Unable to {what}: the category it refers to does not exist");
        }
        if db_error.is_unique_violation() {
            return anyhow!("Unable to {what}: a row with the same id already exists");
        }
        if db_error.is_check_violation() {
            return anyhow!("Unable to {what}: type must be 'income' or 'expense'");
        }
    }
    anyhow::Error::new(e).context(format!("Unable to {what}"))
}

#[async_trait::async_trait]
impl Store for Db {
    async fn categories(&self, user: &str, r#type: Option<EntryType>) -> Res<Vec<Category>> {
        let rows: Vec<CategoryRow> = match r#type {
            None => sqlx::query_as(
                "SELECT id, user_id, name, type, icon, created_at FROM categories \
                WHERE user_id = ? ORDER BY name",
            )
            .bind(user)
            .fetch_all(&self.pool)
            .await,
            Some(r#type) => sqlx::query_as(
                "SELECT id, user_id, name, type, icon, created_at FROM categories \
                WHERE user_id = ? AND type = ? ORDER BY name",
            )
            .bind(user)
            .bind(r#type.to_string())
            .fetch_all(&self.pool)
            .await,
        }
        .context("Unable to fetch categories")?;
        rows.into_iter().map(Category::try_from).collect()
    }

    async fn category(&self, user: &str, id: &str) -> Res<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, user_id, name, type, icon, created_at FROM categories \
            WHERE user_id = ? AND id = ?",
        )
        .bind(user)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Unable to fetch category")?;
        row.map(Category::try_from).transpose()
    }

    async fn category_usage(&self, user: &str, id: &str) -> Res<CategoryUsage> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM transactions WHERE user_id = ?1 AND category_id = ?2), \
                (SELECT COUNT(*) FROM budgets WHERE user_id = ?1 AND category_id = ?2)",
        )
        .bind(user)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .context("Unable to count category usage")?;
        Ok(CategoryUsage {
            transactions: row.0.max(0) as u64,
            budgets: row.1.max(0) as u64,
        })
    }

    async fn insert_category(&self, category: &Category) -> Res<()> {
        sqlx::query(
            "INSERT INTO categories (id, user_id, name, type, icon, created_at) \
            VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&category.user_id)
        .bind(&category.name)
        .bind(category.r#type.to_string())
        .bind(&category.icon)
        .bind(&category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| explain(e, "insert category"))?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Res<bool> {
        let result =
            sqlx::query("UPDATE categories SET name = ?, type = ?, icon = ? WHERE id = ? AND user_id = ?")
                .bind(&category.name)
                .bind(category.r#type.to_string())
                .bind(&category.icon)
                .bind(&category.id)
                .bind(&category.user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| explain(e, "update category"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, user: &str, id: &str) -> Res<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(|e| explain(e, "delete category"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn transactions(
        &self,
        user: &str,
        limit: Option<u32>,
    ) -> Res<Vec<WithCategory<Transaction>>> {
        // SQLite treats a negative LIMIT as no limit.
        let limit = limit.filter(|&n| n > 0).map_or(-1, i64::from);
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{TRANSACTION_SELECT} WHERE t.user_id = ? \
            ORDER BY t.date DESC, t.created_at DESC LIMIT ?"
        ))
        .bind(user)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Unable to fetch transactions")?;
        rows.into_iter().map(WithCategory::try_from).collect()
    }

    async fn transaction(&self, user: &str, id: &str) -> Res<Option<WithCategory<Transaction>>> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "{TRANSACTION_SELECT} WHERE t.user_id = ? AND t.id = ?"
        ))
        .bind(user)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Unable to fetch transaction")?;
        row.map(WithCategory::try_from).transpose()
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Res<()> {
        self.require_category(&transaction.user_id, &transaction.category_id)
            .await?;
        sqlx::query(
            "INSERT INTO transactions \
            (id, user_id, category_id, amount, description, date, type, created_at) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .bind(&transaction.category_id)
        .bind(transaction.amount.to_plain_string())
        .bind(&transaction.description)
        .bind(transaction.date.to_string())
        .bind(transaction.r#type.to_string())
        .bind(&transaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| explain(e, "insert transaction"))?;
        Ok(())
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Res<bool> {
        self.require_category(&transaction.user_id, &transaction.category_id)
            .await?;
        let result = sqlx::query(
            "UPDATE transactions SET category_id = ?, amount = ?, description = ?, date = ?, \
            type = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&transaction.category_id)
        .bind(transaction.amount.to_plain_string())
        .bind(&transaction.description)
        .bind(transaction.date.to_string())
        .bind(transaction.r#type.to_string())
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| explain(e, "update transaction"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_transaction(&self, user: &str, id: &str) -> Res<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(|e| explain(e, "delete transaction"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn budgets(&self, user: &str, month: Option<Month>) -> Res<Vec<WithCategory<Budget>>> {
        let rows: Vec<BudgetRow> = match month {
            None => {
                sqlx::query_as(&format!(
                    "{BUDGET_SELECT} WHERE b.user_id = ? ORDER BY b.created_at DESC"
                ))
                .bind(user)
                .fetch_all(&self.pool)
                .await
            }
            Some(month) => {
                sqlx::query_as(&format!(
                    "{BUDGET_SELECT} WHERE b.user_id = ? AND b.month = ? \
                    ORDER BY b.created_at DESC"
                ))
                .bind(user)
                .bind(month.first_day().to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Unable to fetch budgets")?;
        rows.into_iter().map(WithCategory::try_from).collect()
    }

    async fn budget(&self, user: &str, id: &str) -> Res<Option<WithCategory<Budget>>> {
        let row: Option<BudgetRow> =
            sqlx::query_as(&format!("{BUDGET_SELECT} WHERE b.user_id = ? AND b.id = ?"))
                .bind(user)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("Unable to fetch budget")?;
        row.map(WithCategory::try_from).transpose()
    }

    async fn insert_budget(&self, budget: &Budget) -> Res<()> {
        self.require_category(&budget.user_id, &budget.category_id)
            .await?;
        sqlx::query(
            "INSERT INTO budgets (id, user_id, category_id, amount, month, created_at) \
            VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&budget.id)
        .bind(&budget.user_id)
        .bind(&budget.category_id)
        .bind(budget.amount.to_plain_string())
        .bind(budget.month.first_day().to_string())
        .bind(&budget.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| explain(e, "insert budget"))?;
        Ok(())
    }

    async fn update_budget(&self, budget: &Budget) -> Res<bool> {
        self.require_category(&budget.user_id, &budget.category_id)
            .await?;
        let result = sqlx::query(
            "UPDATE budgets SET category_id = ?, amount = ?, month = ? \
            WHERE id = ? AND user_id = ?",
        )
        .bind(&budget.category_id)
        .bind(budget.amount.to_plain_string())
        .bind(budget.month.first_day().to_string())
        .bind(&budget.id)
        .bind(&budget.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| explain(e, "update budget"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_budget(&self, user: &str, id: &str) -> Res<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(|e| explain(e, "delete budget"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn month_entries(&self, user: &str, month: Month) -> Res<Vec<Entry>> {
        self.entries(user, month, None).await
    }

    async fn month_expenses(&self, user: &str, month: Month) -> Res<Vec<Entry>> {
        self.entries(user, month, Some(EntryType::Expense)).await
    }
}

// The category join matches on user as well so that a row can never pick up another user's
// category.
const TRANSACTION_SELECT: &str = "SELECT t.id, t.user_id, t.category_id, t.amount, \
    t.description, t.date, t.type, t.created_at, \
    c.id AS cat_id, c.name AS cat_name, c.type AS cat_type, c.icon AS cat_icon \
    FROM transactions t \
    LEFT JOIN categories c ON c.id = t.category_id AND c.user_id = t.user_id";

const BUDGET_SELECT: &str = "SELECT b.id, b.user_id, b.category_id, b.amount, b.month, \
    b.created_at, \
    c.id AS cat_id, c.name AS cat_name, c.type AS cat_type, c.icon AS cat_icon \
    FROM budgets b \
    LEFT JOIN categories c ON c.id = b.category_id AND c.user_id = b.user_id";

const ENTRY_SELECT: &str = "SELECT t.amount, t.type, \
    c.id AS cat_id, c.name AS cat_name, c.type AS cat_type, c.icon AS cat_icon \
    FROM transactions t \
    LEFT JOIN categories c ON c.id = t.category_id AND c.user_id = t.user_id";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    user_id: String,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    icon: Option<String>,
    created_at: String,
}

/// The joined category columns of a transaction, budget or entry row.
#[derive(sqlx::FromRow)]
struct JoinedCategory {
    cat_id: Option<String>,
    cat_name: Option<String>,
    cat_type: Option<String>,
    cat_icon: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: String,
    user_id: String,
    category_id: String,
    amount: String,
    description: Option<String>,
    date: String,
    #[sqlx(rename = "type")]
    kind: String,
    created_at: String,
    #[sqlx(flatten)]
    category: JoinedCategory,
}

#[derive(sqlx::FromRow)]
struct BudgetRow {
    id: String,
    user_id: String,
    category_id: String,
    amount: String,
    month: String,
    created_at: String,
    #[sqlx(flatten)]
    category: JoinedCategory,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    amount: String,
    #[sqlx(rename = "type")]
    kind: String,
    #[sqlx(flatten)]
    category: JoinedCategory,
}

fn parse_type(s: &str) -> Res<EntryType> {
    EntryType::from_str(s).with_context(|| format!("Invalid type '{s}' in database"))
}

fn parse_amount(s: &str) -> Res<Amount> {
    let value = Decimal::from_str(s).with_context(|| format!("Invalid amount '{s}' in database"))?;
    Ok(Amount::new(value))
}

fn parse_date(s: &str) -> Res<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}' in database"))
}

impl JoinedCategory {
    /// `None` when the left join found no category.
    fn into_ref(self) -> Res<Option<CategoryRef>> {
        let (Some(id), Some(name), Some(kind)) = (self.cat_id, self.cat_name, self.cat_type) else {
            return Ok(None);
        };
        Ok(Some(CategoryRef::new(id, name, parse_type(&kind)?, self.cat_icon)))
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = anyhow::Error;

    fn try_from(row: CategoryRow) -> Res<Self> {
        Ok(Category {
            r#type: parse_type(&row.kind)?,
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            icon: row.icon,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TransactionRow> for WithCategory<Transaction> {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> Res<Self> {
        let transaction = Transaction {
            amount: parse_amount(&row.amount)?,
            date: parse_date(&row.date)?,
            r#type: parse_type(&row.kind)?,
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            description: row.description,
            created_at: row.created_at,
        };
        Ok(WithCategory::new(transaction, row.category.into_ref()?))
    }
}

impl TryFrom<BudgetRow> for WithCategory<Budget> {
    type Error = anyhow::Error;

    fn try_from(row: BudgetRow) -> Res<Self> {
        let budget = Budget {
            amount: parse_amount(&row.amount)?,
            month: Month::from_str(&row.month)
                .with_context(|| format!("Invalid month '{}' in database", row.month))?,
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            created_at: row.created_at,
        };
        Ok(WithCategory::new(budget, row.category.into_ref()?))
    }
}

impl TryFrom<EntryRow> for Entry {
    type Error = anyhow::Error;

    fn try_from(row: EntryRow) -> Res<Self> {
        Ok(Entry::new(
            parse_amount(&row.amount)?,
            parse_type(&row.kind)?,
            row.category.into_ref()?,
        ))
    }
}
