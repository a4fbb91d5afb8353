//! The tools exposed by the fintrack MCP server.

use crate::args::{
    IdArgs, InsertBudgetArgs, InsertCategoryArgs, InsertTransactionArgs, ListBudgetsArgs,
    ListCategoriesArgs, ListTransactionsArgs, MonthArgs, TrendArgs, UpdateBudgetArgs,
    UpdateCategoryArgs, UpdateTransactionArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::FintrackServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::debug;

#[tool_router(vis = "pub(super)")]
impl FintrackServer {
    #[tool]
    /// Initialize the fintrack MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        debug!("MCP: initialized for user {}", self.ledger.user());
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// Create an income or expense category. Returns the new category including its generated
    /// `id`, which transactions and budgets refer to.
    #[tool]
    async fn insert_category(
        &self,
        Parameters(args): Parameters<InsertCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::insert_category(&self.ledger, args).await)
    }

    /// Record a transaction. `amount` is never negative: whether money came in or went out is
    /// decided by the category's type. `type` may be left out, and if given it must match the
    /// category. `date` defaults to today.
    #[tool]
    async fn insert_transaction(
        &self,
        Parameters(args): Parameters<InsertTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::insert_transaction(&self.ledger, args).await)
    }

    /// Set a monthly spending limit on an expense category. `month` is `YYYY-MM` and defaults to
    /// the current month. The limit must be greater than zero.
    #[tool]
    async fn insert_budget(
        &self,
        Parameters(args): Parameters<InsertBudgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::insert_budget(&self.ledger, args).await)
    }

    /// Replace the name, type and icon of a category. An icon that is left out is removed. The
    /// type can only change while no transactions or budgets use the category.
    #[tool]
    async fn update_category(
        &self,
        Parameters(args): Parameters<UpdateCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_category(&self.ledger, args).await)
    }

    /// Replace every field of a transaction. A description that is left out is removed. Use
    /// `get_transaction` first if you only want to change some fields.
    #[tool]
    async fn update_transaction(
        &self,
        Parameters(args): Parameters<UpdateTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_transaction(&self.ledger, args).await)
    }

    /// Replace the category, limit and month of a budget.
    #[tool]
    async fn update_budget(
        &self,
        Parameters(args): Parameters<UpdateBudgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_budget(&self.ledger, args).await)
    }

    /// Delete a category. **Caution**: this also deletes every transaction and budget in the
    /// category.
    #[tool]
    async fn delete_category(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_category(&self.ledger, args).await)
    }

    /// Delete a transaction by id.
    #[tool]
    async fn delete_transaction(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_transaction(&self.ledger, args).await)
    }

    /// Delete a budget by id.
    #[tool]
    async fn delete_budget(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_budget(&self.ledger, args).await)
    }

    /// Get one category by id.
    #[tool]
    async fn get_category(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::get_category(&self.ledger, args).await)
    }

    /// Get one transaction by id, with its category.
    #[tool]
    async fn get_transaction(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::get_transaction(&self.ledger, args).await)
    }

    /// Get one budget by id, with its category.
    #[tool]
    async fn get_budget(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::get_budget(&self.ledger, args).await)
    }

    /// List categories ordered by name, optionally only `income` or only `expense` ones.
    #[tool]
    async fn list_categories(
        &self,
        Parameters(args): Parameters<ListCategoriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_categories(&self.ledger, args).await)
    }

    /// List transactions, newest first. Pass `limit` to get only the most recent ones.
    #[tool]
    async fn list_transactions(
        &self,
        Parameters(args): Parameters<ListTransactionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_transactions(&self.ledger, args).await)
    }

    /// List budgets, most recently created first, optionally only those of one `month`.
    #[tool]
    async fn list_budgets(
        &self,
        Parameters(args): Parameters<ListBudgetsArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_budgets(&self.ledger, args).await)
    }

    /// Total income, total expenses, balance and savings rate for a month, the current month by
    /// default.
    #[tool]
    async fn monthly_stats(
        &self,
        Parameters(args): Parameters<MonthArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::monthly_stats(&self.ledger, args).await)
    }

    /// Expenses of a month grouped by category, largest first, with each category's percentage
    /// of the month's total expenses.
    #[tool]
    async fn spending_report(
        &self,
        Parameters(args): Parameters<MonthArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::spending_report(&self.ledger, args).await)
    }

    /// Income, expenses and balance for each of `months` months ending with `month`, oldest
    /// first.
    #[tool]
    async fn trend_report(
        &self,
        Parameters(args): Parameters<TrendArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::trend_report(&self.ledger, args).await)
    }

    /// For each budget of a month: the limit, how much has been spent in its category, what
    /// remains and whether it is over budget.
    #[tool]
    async fn budget_report(
        &self,
        Parameters(args): Parameters<MonthArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::budget_report(&self.ledger, args).await)
    }

    /// A quick overview: the most recent transactions, this month's totals and this month's
    /// budget progress.
    #[tool]
    async fn dashboard(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::dashboard(&self.ledger).await)
    }
}
