//! Command handlers for the fintrack CLI.
//!
//! This module contains implementations for all CLI subcommands. The MCP server calls the same
//! functions.

mod delete;
mod get;
mod init;
mod insert;
mod list;
mod mcp;
mod report;
mod update;
mod validate;

use crate::args::Format;
use crate::error::{ErrorType, IntoResult};
use crate::render::Render;
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::{delete_budget, delete_category, delete_transaction};
pub use get::{get_budget, get_category, get_transaction};
pub use init::init;
pub use insert::{insert_budget, insert_category, insert_transaction};
pub use list::{list_budgets, list_categories, list_transactions};
pub use mcp::mcp;
pub use report::{
    budget_report, dashboard, monthly_stats, spending_report, trend_report, Dashboard,
    MonthlyStats, SpendingReport,
};
pub use update::{update_budget, update_category, update_transaction};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug + Render,
{
    /// Does what `print` does, then writes the structured data to stdout in `format`.
    pub fn print_rows(&self, format: Format) -> Result<()> {
        self.print();
        if let Some(structure) = self.structure() {
            let rows = structure.render(format).pub_result(ErrorType::Internal)?;
            println!("{rows}");
        }
        Ok(())
    }
}
