//! fintrack: personal income, expense and budget tracking from the CLI or over MCP.
//!
//! The `commands` module holds one function per operation. Each takes a `Ledger`, which bundles
//! the data store with the user it acts for, and returns an `Out` with a message and structured
//! output.

pub mod analytics;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod ledger;
mod mcp;
pub mod model;
mod render;
mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, IntoResult, Result};
pub use ledger::Ledger;
pub use render::{Render, Rows, Tabular};
pub use store::{Mode, IN_MEMORY_ENV};
