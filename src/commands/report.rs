//! Report command handlers.
//!
//! Each report fetches one user's rows for the months it covers and hands them to the pure
//! functions in `analytics`. A failed fetch is reported as `DataUnavailable`.

use crate::analytics::{
    budget_progress, category_breakdown, spending_shares, BudgetProgress, MonthSummary,
    MonthlyTotals, Percent, SpendingShare,
};
use crate::args::{Format, MonthArgs, TrendArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Amount, Entry, Month, Transaction, WithCategory};
use crate::render::{csv_text, markdown, Render, Rows, Tabular};
use crate::utils::plural;
use crate::{Ledger, Result};
use anyhow::{anyhow, Context};
use serde::Serialize;
use tracing::debug;

/// The most months a trend may cover.
const MAX_TREND_MONTHS: u32 = 120;

/// A month's totals together with its savings rate.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyStats {
    month: Month,
    label: String,
    #[serde(flatten)]
    totals: MonthlyTotals,
    savings_rate: Percent,
}

impl MonthlyStats {
    fn new(month: Month, totals: MonthlyTotals) -> Self {
        Self {
            month,
            label: month.label(),
            savings_rate: totals.savings_rate(),
            totals,
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn totals(&self) -> &MonthlyTotals {
        &self.totals
    }

    pub fn savings_rate(&self) -> Percent {
        self.savings_rate
    }
}

impl Tabular for MonthlyStats {
    fn headers() -> Vec<&'static str> {
        vec!["month", "income", "expenses", "balance", "savings rate"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.totals.income().to_string(),
            self.totals.expenses().to_string(),
            self.totals.balance().to_string(),
            self.savings_rate.to_string(),
        ]
    }
}

impl Render for MonthlyStats {
    fn render(&self, format: Format) -> Res<Rows> {
        Rows::render_one(self, format)
    }
}

/// A month's expenses by category, largest first, with each category's share.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SpendingReport {
    month: Month,
    total_expenses: Amount,
    categories: Vec<SpendingShare>,
}

impl SpendingReport {
    pub fn month(&self) -> Month {
        self.month
    }

    pub fn total_expenses(&self) -> Amount {
        self.total_expenses
    }

    pub fn categories(&self) -> &[SpendingShare] {
        &self.categories
    }
}

impl Render for SpendingReport {
    fn render(&self, format: Format) -> Res<Rows> {
        match format {
            Format::Json => Ok(Rows::Json(
                serde_json::to_value(self).context("Unable to serialize the spending report")?,
            )),
            _ => Rows::render(&self.categories, format),
        }
    }
}

/// The overview shown when nothing more specific is asked for.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Dashboard {
    recent_transactions: Vec<WithCategory<Transaction>>,
    stats: MonthlyStats,
    budgets: Vec<BudgetProgress>,
}

impl Dashboard {
    pub fn recent_transactions(&self) -> &[WithCategory<Transaction>] {
        &self.recent_transactions
    }

    pub fn stats(&self) -> &MonthlyStats {
        &self.stats
    }

    pub fn budgets(&self) -> &[BudgetProgress] {
        &self.budgets
    }
}

impl Render for Dashboard {
    fn render(&self, format: Format) -> Res<Rows> {
        match format {
            Format::Json => Ok(Rows::Json(
                serde_json::to_value(self).context("Unable to serialize the dashboard")?,
            )),
            Format::Table => Ok(Rows::Table(
                [
                    section("Recent transactions", &self.recent_transactions),
                    section(&self.stats.label, std::slice::from_ref(&self.stats)),
                    section("Budgets", &self.budgets),
                ]
                .join("\n\n"),
            )),
            Format::Csv => Ok(Rows::Csv(
                [
                    csv_section(&self.recent_transactions)?,
                    csv_section(std::slice::from_ref(&self.stats))?,
                    csv_section(&self.budgets)?,
                ]
                .join("\n"),
            )),
        }
    }
}

fn section<T: Tabular>(title: &str, rows: &[T]) -> String {
    format!(
        "## {title}\n\n{}",
        markdown(&T::headers(), rows.iter().map(Tabular::cells))
    )
}

fn csv_section<T: Tabular>(rows: &[T]) -> Res<String> {
    csv_text(&T::headers(), rows.iter().map(Tabular::cells))
}

/// Income, expenses, balance and savings rate for a month, the current month by default.
pub async fn monthly_stats(ledger: &Ledger, args: MonthArgs) -> Result<Out<MonthlyStats>> {
    let month = args.month.unwrap_or_else(Month::current);
    let entries = month_entries(ledger, month).await?;
    let stats = MonthlyStats::new(month, MonthlyTotals::compute(&entries));
    let message = format!(
        "{}: income {}, expenses {}, balance {}",
        stats.label,
        stats.totals.income(),
        stats.totals.expenses(),
        stats.totals.balance()
    );
    Ok(Out::new(message, stats))
}

/// A month's expenses grouped by category, largest first.
pub async fn spending_report(ledger: &Ledger, args: MonthArgs) -> Result<Out<SpendingReport>> {
    let month = args.month.unwrap_or_else(Month::current);
    let entries = month_entries(ledger, month).await?;
    let totals = MonthlyTotals::compute(&entries);
    let breakdown = category_breakdown(&entries);
    let report = SpendingReport {
        month,
        total_expenses: totals.expenses(),
        categories: spending_shares(breakdown, totals.expenses()),
    };
    let message = format!(
        "Spent {} across {} categor{} in {}",
        report.total_expenses,
        report.categories.len(),
        if report.categories.len() == 1 { "y" } else { "ies" },
        month.label()
    );
    Ok(Out::new(message, report))
}

/// Totals for each of several months ending with (and including) a month, oldest first.
pub async fn trend_report(ledger: &Ledger, args: TrendArgs) -> Result<Out<Vec<MonthSummary>>> {
    let end = args.month.unwrap_or_else(Month::current);
    let count = args.months.unwrap_or(ledger.trend_months());
    if count == 0 || count > MAX_TREND_MONTHS {
        return Err(anyhow!(
            "A trend covers from 1 to {MAX_TREND_MONTHS} months, got {count}"
        ))
        .pub_result(ErrorType::Request);
    }

    let mut summaries = Vec::with_capacity(count as usize);
    for month in end.trailing(count) {
        let entries = month_entries(ledger, month).await?;
        summaries.push(MonthSummary::new(month, MonthlyTotals::compute(&entries)));
    }
    let message = format!(
        "Trend over {count} month{} ending {}",
        plural(u64::from(count), "s"),
        end.label()
    );
    Ok(Out::new(message, summaries))
}

/// How much of each of a month's budgets has been spent.
pub async fn budget_report(ledger: &Ledger, args: MonthArgs) -> Result<Out<Vec<BudgetProgress>>> {
    let month = args.month.unwrap_or_else(Month::current);
    let progress = month_progress(ledger, month).await?;
    let over = progress.iter().filter(|p| p.over_budget()).count() as u64;
    let message = format!(
        "{} budget{} in {}, {over} over budget",
        progress.len(),
        plural(progress.len() as u64, "s"),
        month.label()
    );
    Ok(Out::new(message, progress))
}

/// Recent transactions, the current month's totals and the current month's budget progress.
pub async fn dashboard(ledger: &Ledger) -> Result<Out<Dashboard>> {
    let month = Month::current();
    let recent_transactions = ledger
        .store()
        .transactions(ledger.user(), Some(ledger.recent_limit()))
        .await
        .context("Unable to load recent transactions")
        .pub_result(ErrorType::DataUnavailable)?;
    let entries = month_entries(ledger, month).await?;
    let stats = MonthlyStats::new(month, MonthlyTotals::compute(&entries));
    let budgets = month_progress(ledger, month).await?;

    let message = format!(
        "{}: balance {} with {} recent transaction{}",
        stats.label,
        stats.totals.balance(),
        recent_transactions.len(),
        plural(recent_transactions.len() as u64, "s")
    );
    Ok(Out::new(
        message,
        Dashboard {
            recent_transactions,
            stats,
            budgets,
        },
    ))
}

async fn month_entries(ledger: &Ledger, month: Month) -> Result<Vec<Entry>> {
    let entries = ledger
        .store()
        .month_entries(ledger.user(), month)
        .await
        .with_context(|| format!("Unable to load transactions for {month}"))
        .pub_result(ErrorType::DataUnavailable)?;
    debug!("Loaded {} entries for {month}", entries.len());
    Ok(entries)
}

async fn month_progress(ledger: &Ledger, month: Month) -> Result<Vec<BudgetProgress>> {
    let budgets = ledger
        .store()
        .budgets(ledger.user(), Some(month))
        .await
        .with_context(|| format!("Unable to load budgets for {month}"))
        .pub_result(ErrorType::DataUnavailable)?;
    let expenses = ledger
        .store()
        .month_expenses(ledger.user(), month)
        .await
        .with_context(|| format!("Unable to load expenses for {month}"))
        .pub_result(ErrorType::DataUnavailable)?;
    Ok(budget_progress(&budgets, &expenses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{InsertBudgetArgs, InsertTransactionArgs};
    use crate::commands::{insert_budget, insert_transaction};
    use crate::error::Res;
    use crate::model::{Budget, Category, EntryType};
    use crate::store::{CategoryUsage, MemoryStore, Store};
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn month_args(month: Month) -> MonthArgs {
        MonthArgs::new(Some(month))
    }

    #[tokio::test]
    async fn test_monthly_stats_example() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;

        let out = monthly_stats(env.ledger(), month_args(data.month))
            .await
            .unwrap();

        let stats = out.structure().unwrap();
        assert_eq!(stats.totals().income().value(), dec("100"));
        assert_eq!(stats.totals().expenses().value(), dec("75"));
        assert_eq!(stats.totals().balance().value(), dec("25"));
        assert_eq!(stats.savings_rate().value(), dec("25"));
        assert_eq!(
            out.message(),
            "Oct 2025: income $100.00, expenses $75.00, balance $25.00"
        );
    }

    #[tokio::test]
    async fn test_monthly_stats_month_boundaries() {
        let env = TestEnv::new().await;
        let food = env.insert_category("Food", EntryType::Expense).await;
        env.insert_transaction(&food, "1", "2024-01-31").await;
        env.insert_transaction(&food, "2", "2024-02-01").await;
        env.insert_transaction(&food, "4", "2024-02-29").await;
        env.insert_transaction(&food, "8", "2024-03-01").await;
        env.insert_transaction(&food, "16", "2024-04-30").await;
        env.insert_transaction(&food, "32", "2024-05-01").await;

        let feb = monthly_stats(env.ledger(), month_args(Month::new(2024, 2).unwrap()))
            .await
            .unwrap();
        assert_eq!(feb.structure().unwrap().totals().expenses().value(), dec("6"));

        let apr = monthly_stats(env.ledger(), month_args(Month::new(2024, 4).unwrap()))
            .await
            .unwrap();
        assert_eq!(apr.structure().unwrap().totals().expenses().value(), dec("16"));
    }

    #[tokio::test]
    async fn test_empty_month_is_all_zero() {
        let env = TestEnv::new().await;
        let out = monthly_stats(env.ledger(), month_args(Month::new(2020, 1).unwrap()))
            .await
            .unwrap();
        let stats = out.structure().unwrap();
        assert_eq!(stats.totals(), &MonthlyTotals::default());
        assert_eq!(stats.savings_rate().value(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_spending_report_example() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;

        let out = spending_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();

        let report = out.structure().unwrap();
        assert_eq!(report.total_expenses().value(), dec("75"));
        let rows: Vec<(&str, Decimal, Decimal)> = report
            .categories()
            .iter()
            .map(|s| {
                (
                    s.spending().name(),
                    s.spending().amount().value(),
                    s.percent().value(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Food", dec("50"), dec("66.7")),
                ("Transport", dec("25"), dec("33.3")),
            ]
        );
        assert_eq!(out.message(), "Spent $75.00 across 2 categories in Oct 2025");
    }

    #[tokio::test]
    async fn test_spending_report_is_idempotent() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        let a = spending_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        let b = spending_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        assert_eq!(a.structure(), b.structure());
    }

    #[tokio::test]
    async fn test_reports_hold_up_at_the_largest_amounts() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        let max = Amount::MAX.to_string();
        env.insert_transaction(&data.food, &max, "2025-10-02").await;
        env.insert_transaction(&data.food, &max, "2025-10-03").await;
        insert_budget(
            env.ledger(),
            InsertBudgetArgs::new(data.food.id(), Amount::new(Amount::MAX), Some(data.month)),
        )
        .await
        .unwrap();

        let stats = monthly_stats(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        let totals = stats.structure().unwrap().totals();
        assert_eq!(totals.expenses().value(), dec("2000000000075"));
        assert_eq!(totals.expenses().to_string(), "$2,000,000,000,075.00");
        assert_eq!(totals.balance().value(), dec("-1999999999975"));

        let spending = spending_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        let top = &spending.structure().unwrap().categories()[0];
        assert_eq!(top.spending().name(), "Food");
        assert_eq!(top.spending().amount().value(), dec("2000000000050"));

        let budgets = budget_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        let food = &budgets.structure().unwrap()[0];
        assert_eq!(food.percent_used().value(), dec("200"));
        assert!(food.over_budget());

        assert!(trend_report(env.ledger(), TrendArgs::new(Some(data.month), Some(2)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_amount_over_the_maximum_never_reaches_reports() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        for amount in ["50000000000000000000000000000", "1000000000000.01"] {
            let args = InsertTransactionArgs::new(
                data.food.id(),
                Amount::from_str(amount).unwrap(),
                Some(data.month.first_day()),
            );
            let err = insert_transaction(env.ledger(), args).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Request);
        }

        let stats = monthly_stats(env.ledger(), month_args(data.month))
            .await
            .unwrap();
        assert_eq!(stats.structure().unwrap().totals().expenses().value(), dec("75"));
    }

    #[tokio::test]
    async fn test_trend_report_oldest_first() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        env.insert_transaction(&data.salary, "50", "2025-08-15").await;

        let args = TrendArgs::new(Some(data.month), Some(3));
        let out = trend_report(env.ledger(), args).await.unwrap();

        let summaries = out.structure().unwrap();
        let labels: Vec<&str> = summaries.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Aug 2025", "Sep 2025", "Oct 2025"]);
        assert_eq!(summaries[0].totals().income().value(), dec("50"));
        assert_eq!(summaries[1].totals(), &MonthlyTotals::default());
        assert_eq!(summaries[2].totals().balance().value(), dec("25"));
    }

    #[tokio::test]
    async fn test_trend_defaults_to_configured_months() {
        let env = TestEnv::new().await;
        let out = trend_report(env.ledger(), TrendArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 6);
        assert_eq!(
            out.structure().unwrap().last().unwrap().month(),
            Month::current()
        );
    }

    #[tokio::test]
    async fn test_trend_rejects_zero_months() {
        let env = TestEnv::new().await;
        let err = trend_report(env.ledger(), TrendArgs::new(None, Some(0)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_budget_report() {
        let env = TestEnv::new().await;
        let data = env.insert_test_data().await;
        for (category, limit) in [(&data.food, "40"), (&data.transport, "100")] {
            insert_budget(
                env.ledger(),
                InsertBudgetArgs::new(
                    category.id(),
                    Amount::from_str(limit).unwrap(),
                    Some(data.month),
                ),
            )
            .await
            .unwrap();
        }

        let out = budget_report(env.ledger(), month_args(data.month))
            .await
            .unwrap();

        let progress = out.structure().unwrap();
        assert_eq!(progress.len(), 2);
        let food = progress
            .iter()
            .find(|p| p.category().unwrap().name() == "Food")
            .unwrap();
        assert_eq!(food.spent().value(), dec("50"));
        assert_eq!(food.remaining().value(), dec("-10"));
        assert_eq!(food.percent_used().value(), dec("125"));
        assert!(food.over_budget());
        let transport = progress
            .iter()
            .find(|p| p.category().unwrap().name() == "Transport")
            .unwrap();
        assert_eq!(transport.spent().value(), dec("25"));
        assert!(!transport.over_budget());
        assert_eq!(out.message(), "2 budgets in Oct 2025, 1 over budget");
    }

    #[tokio::test]
    async fn test_dashboard_over_seeded_memory_store() {
        let ledger = Ledger::new(Arc::new(MemoryStore::seeded("demo")), "demo", 6, 5);

        let out = dashboard(&ledger).await.unwrap();

        let dashboard = out.structure().unwrap();
        assert_eq!(dashboard.recent_transactions().len(), 5);
        assert_eq!(dashboard.stats().month(), Month::current());
        assert_eq!(dashboard.budgets().len(), 3);
        for format in [Format::Table, Format::Csv, Format::Json] {
            let text = dashboard.render(format).unwrap().to_string();
            assert!(!text.is_empty());
        }
        let table = dashboard.render(Format::Table).unwrap().to_string();
        assert!(table.starts_with("## Recent transactions"));
        assert!(table.contains("## Budgets"));
    }

    /// A store whose reads always fail.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl Store for BrokenStore {
        async fn categories(&self, _: &str, _: Option<EntryType>) -> Res<Vec<Category>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn category(&self, _: &str, _: &str) -> Res<Option<Category>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn category_usage(&self, _: &str, _: &str) -> Res<CategoryUsage> {
            Err(anyhow!("disk unplugged"))
        }
        async fn insert_category(&self, _: &Category) -> Res<()> {
            Err(anyhow!("disk unplugged"))
        }
        async fn update_category(&self, _: &Category) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn delete_category(&self, _: &str, _: &str) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn transactions(
            &self,
            _: &str,
            _: Option<u32>,
        ) -> Res<Vec<WithCategory<Transaction>>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn transaction(&self, _: &str, _: &str) -> Res<Option<WithCategory<Transaction>>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn insert_transaction(&self, _: &Transaction) -> Res<()> {
            Err(anyhow!("disk unplugged"))
        }
        async fn update_transaction(&self, _: &Transaction) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn delete_transaction(&self, _: &str, _: &str) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn budgets(&self, _: &str, _: Option<Month>) -> Res<Vec<WithCategory<Budget>>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn budget(&self, _: &str, _: &str) -> Res<Option<WithCategory<Budget>>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn insert_budget(&self, _: &Budget) -> Res<()> {
            Err(anyhow!("disk unplugged"))
        }
        async fn update_budget(&self, _: &Budget) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn delete_budget(&self, _: &str, _: &str) -> Res<bool> {
            Err(anyhow!("disk unplugged"))
        }
        async fn month_entries(&self, _: &str, _: Month) -> Res<Vec<Entry>> {
            Err(anyhow!("disk unplugged"))
        }
        async fn month_expenses(&self, _: &str, _: Month) -> Res<Vec<Entry>> {
            Err(anyhow!("disk unplugged"))
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_data_unavailable() {
        let ledger = Ledger::new(Arc::new(BrokenStore), "u1", 6, 5);
        let month = Month::new(2025, 10).unwrap();

        let err = monthly_stats(&ledger, month_args(month)).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataUnavailable);
        assert!(format!("{err}").contains("disk unplugged"));

        let err = spending_report(&ledger, month_args(month))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataUnavailable);

        let err = budget_report(&ledger, month_args(month)).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataUnavailable);

        let err = dashboard(&ledger).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataUnavailable);
    }
}
