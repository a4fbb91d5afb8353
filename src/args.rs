//! These structs provide the CLI interface for the fintrack CLI. The per-command argument structs
//! also derive `Deserialize` and `JsonSchema` so that the MCP server can take them as tool
//! parameters.

use crate::model::{Amount, EntryType, Month};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: A command-line tool for tracking personal income, expenses and monthly budgets.
///
/// Record transactions, organize them into income and expense categories, set monthly spending
/// limits per category and see where your money went: monthly totals, spending by category,
/// trends over several months and progress against your budgets.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass this as --fintrack-home, by default it will be $HOME/fintrack. Pass --user to
    /// choose the default user, otherwise a random id is generated for you.
    Init,
    /// Add a category, transaction or budget.
    Insert(InsertArgs),
    /// Replace every field of a category, transaction or budget.
    Update(UpdateArgs),
    /// Delete a category, transaction or budget. Deleting a category also deletes its
    /// transactions and budgets.
    Delete(DeleteArgs),
    /// Show a single category, transaction or budget.
    Get(GetArgs),
    /// List categories, transactions or budgets.
    List(ListArgs),
    /// Summarize a month: totals, spending by category, trends, budgets or a dashboard.
    Report(ReportArgs),
    /// Run the MCP server over stdio so that an AI agent can use fintrack.
    Mcp,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,

    /// The user to act for. Defaults to the user in the config file.
    #[arg(long, env = "FINTRACK_USER", global = true)]
    user: Option<String>,

    /// How to print lists and reports.
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf, user: Option<String>) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
            user,
            format: Format::default(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

/// How rows are written to stdout.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned columns for reading in a terminal.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

/// Args for the `fintrack insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Add an income or expense category.
    Category(InsertCategoryArgs),
    /// Record a transaction in one of your categories.
    Transaction(InsertTransactionArgs),
    /// Set a spending limit for an expense category in a month.
    Budget(InsertBudgetArgs),
}

/// Args for the `fintrack insert category` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "InsertCategoryArgs")]
pub struct InsertCategoryArgs {
    /// The name of the category, e.g. "Groceries".
    #[arg(long)]
    pub(crate) name: String,

    /// Whether the category is for income or expenses.
    #[arg(long = "type", value_enum)]
    pub(crate) r#type: EntryType,

    /// An optional emoji or short marker shown next to the category name.
    #[arg(long)]
    #[serde(default)]
    pub(crate) icon: Option<String>,
}

impl InsertCategoryArgs {
    pub fn new(name: impl Into<String>, r#type: EntryType, icon: Option<String>) -> Self {
        Self {
            name: name.into(),
            r#type,
            icon,
        }
    }
}

/// Args for the `fintrack insert transaction` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "InsertTransactionArgs")]
pub struct InsertTransactionArgs {
    /// The id of the category the transaction belongs to.
    #[arg(long = "category")]
    pub(crate) category_id: String,

    /// The amount, never negative, e.g. "42.50" or "$1,200". The direction of the money comes from
    /// the type.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,

    /// The date of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) date: Option<NaiveDate>,

    /// An optional description, e.g. the merchant.
    #[arg(long)]
    #[serde(default)]
    pub(crate) description: Option<String>,

    /// Income or expense. Defaults to the type of the category and must match it when given.
    #[arg(long = "type", value_enum)]
    #[serde(default)]
    pub(crate) r#type: Option<EntryType>,
}

impl InsertTransactionArgs {
    pub fn new(category_id: impl Into<String>, amount: Amount, date: Option<NaiveDate>) -> Self {
        Self {
            category_id: category_id.into(),
            amount,
            date,
            description: None,
            r#type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, r#type: EntryType) -> Self {
        self.r#type = Some(r#type);
        self
    }
}

/// Args for the `fintrack insert budget` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "InsertBudgetArgs")]
pub struct InsertBudgetArgs {
    /// The id of the expense category to limit.
    #[arg(long = "category")]
    pub(crate) category_id: String,

    /// The spending limit for the month. Must be greater than zero.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,

    /// The month as YYYY-MM. A full date is accepted and normalized to its month. Defaults to the
    /// current month.
    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) month: Option<Month>,
}

impl InsertBudgetArgs {
    pub fn new(category_id: impl Into<String>, amount: Amount, month: Option<Month>) -> Self {
        Self {
            category_id: category_id.into(),
            amount,
            month,
        }
    }
}

/// Args for the `fintrack update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Replace the name, type and icon of a category.
    Category(UpdateCategoryArgs),
    /// Replace every field of a transaction.
    Transaction(UpdateTransactionArgs),
    /// Replace the category, limit and month of a budget.
    Budget(UpdateBudgetArgs),
}

/// Args for the `fintrack update category` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "UpdateCategoryArgs")]
pub struct UpdateCategoryArgs {
    /// The id of the category to update.
    pub(crate) id: String,

    #[arg(long)]
    pub(crate) name: String,

    /// The type can only change while no transactions or budgets use the category.
    #[arg(long = "type", value_enum)]
    pub(crate) r#type: EntryType,

    /// The icon. Leaving it out removes the current icon.
    #[arg(long)]
    #[serde(default)]
    pub(crate) icon: Option<String>,
}

impl UpdateCategoryArgs {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        r#type: EntryType,
        icon: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            r#type,
            icon,
        }
    }
}

/// Args for the `fintrack update transaction` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "UpdateTransactionArgs")]
pub struct UpdateTransactionArgs {
    /// The id of the transaction to update.
    pub(crate) id: String,

    #[arg(long = "category")]
    pub(crate) category_id: String,

    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,

    /// YYYY-MM-DD
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) date: NaiveDate,

    /// The description. Leaving it out removes the current description.
    #[arg(long)]
    #[serde(default)]
    pub(crate) description: Option<String>,

    /// Defaults to the type of the category and must match it when given.
    #[arg(long = "type", value_enum)]
    #[serde(default)]
    pub(crate) r#type: Option<EntryType>,
}

impl UpdateTransactionArgs {
    pub fn new(
        id: impl Into<String>,
        category_id: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            amount,
            date,
            description,
            r#type: None,
        }
    }
}

/// Args for the `fintrack update budget` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "UpdateBudgetArgs")]
pub struct UpdateBudgetArgs {
    /// The id of the budget to update.
    pub(crate) id: String,

    #[arg(long = "category")]
    pub(crate) category_id: String,

    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,

    /// YYYY-MM
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) month: Month,
}

impl UpdateBudgetArgs {
    pub fn new(
        id: impl Into<String>,
        category_id: impl Into<String>,
        amount: Amount,
        month: Month,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            amount,
            month,
        }
    }
}

/// Args for the `fintrack delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: EntitySubcommand,
}

impl DeleteArgs {
    pub fn entity(&self) -> &EntitySubcommand {
        &self.entity
    }
}

/// Args for the `fintrack get` command.
#[derive(Debug, Parser, Clone)]
pub struct GetArgs {
    #[command(subcommand)]
    entity: EntitySubcommand,
}

impl GetArgs {
    pub fn entity(&self) -> &EntitySubcommand {
        &self.entity
    }
}

/// Picks one kind of row by id.
#[derive(Subcommand, Debug, Clone)]
pub enum EntitySubcommand {
    Category(IdArgs),
    Transaction(IdArgs),
    Budget(IdArgs),
}

/// Identifies a single row.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "IdArgs")]
pub struct IdArgs {
    /// The id of the category, transaction or budget.
    pub(crate) id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Args for the `fintrack list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List categories by name.
    Categories(ListCategoriesArgs),
    /// List transactions, newest first.
    Transactions(ListTransactionsArgs),
    /// List budgets, most recently created first.
    Budgets(ListBudgetsArgs),
}

/// Args for the `fintrack list categories` command.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "ListCategoriesArgs")]
pub struct ListCategoriesArgs {
    /// Only list categories of this type.
    #[arg(long = "type", value_enum)]
    #[serde(default)]
    pub(crate) r#type: Option<EntryType>,
}

/// Args for the `fintrack list transactions` command.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "ListTransactionsArgs")]
pub struct ListTransactionsArgs {
    /// The most transactions to return. All of them when left out or zero.
    #[arg(long)]
    #[serde(default)]
    pub(crate) limit: Option<u32>,
}

impl ListTransactionsArgs {
    pub fn new(limit: Option<u32>) -> Self {
        Self { limit }
    }
}

/// Args for the `fintrack list budgets` command.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "ListBudgetsArgs")]
pub struct ListBudgetsArgs {
    /// Only list the budgets of this month, YYYY-MM.
    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) month: Option<Month>,
}

impl ListBudgetsArgs {
    pub fn new(month: Option<Month>) -> Self {
        Self { month }
    }
}

/// Args for the `fintrack report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(subcommand)]
    kind: ReportSubcommand,
}

impl ReportArgs {
    pub fn kind(&self) -> &ReportSubcommand {
        &self.kind
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportSubcommand {
    /// Income, expenses, balance and savings rate for a month.
    Stats(MonthArgs),
    /// Expenses by category for a month, largest first.
    Spending(MonthArgs),
    /// Income, expenses and balance for each of several months ending with a month.
    Trend(TrendArgs),
    /// How much of each budget of a month has been spent.
    Budgets(MonthArgs),
    /// Recent transactions, this month's totals and this month's budget progress.
    Dashboard,
}

/// Picks the month a report covers.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "MonthArgs")]
pub struct MonthArgs {
    /// The month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) month: Option<Month>,
}

impl MonthArgs {
    pub fn new(month: Option<Month>) -> Self {
        Self { month }
    }
}

/// Args for the `fintrack report trend` command.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "TrendArgs")]
pub struct TrendArgs {
    /// The last month of the trend as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) month: Option<Month>,

    /// How many months to cover. Defaults to the `trend_months` setting.
    #[arg(long)]
    #[serde(default)]
    pub(crate) months: Option<u32>,
}

impl TrendArgs {
    pub fn new(month: Option<Month>, months: Option<u32>) -> Self {
        Self { month, months }
    }
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
