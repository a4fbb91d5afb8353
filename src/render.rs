//! Turns command output into text for stdout.
//!
//! Anything printable as rows implements `Tabular`. `Rows::render` then writes a slice of them as a
//! Markdown table, CSV or pretty JSON depending on `Format`.

use crate::analytics::{BudgetProgress, MonthSummary, SpendingShare};
use crate::args::Format;
use crate::error::Res;
use crate::model::{Budget, Category, Transaction, WithCategory};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// A row type with a fixed set of columns.
pub trait Tabular: Serialize {
    fn headers() -> Vec<&'static str>;

    fn cells(&self) -> Vec<String>;
}

/// Rendered rows in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// A JSON array with one object per row.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data with a header row.
    Csv(String),
}

impl Rows {
    pub fn render<T: Tabular>(items: &[T], format: Format) -> Res<Rows> {
        match format {
            Format::Json => Ok(Rows::Json(
                serde_json::to_value(items).context("Unable to serialize rows")?,
            )),
            Format::Table => Ok(Rows::Table(markdown(
                &T::headers(),
                items.iter().map(Tabular::cells),
            ))),
            Format::Csv => Ok(Rows::Csv(csv_text(
                &T::headers(),
                items.iter().map(Tabular::cells),
            )?)),
        }
    }

    /// A single object rather than an array in JSON, one row otherwise.
    pub fn render_one<T: Tabular>(item: &T, format: Format) -> Res<Rows> {
        match format {
            Format::Json => Ok(Rows::Json(
                serde_json::to_value(item).context("Unable to serialize row")?,
            )),
            _ => Self::render(std::slice::from_ref(item), format),
        }
    }
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({v:?})"),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write!(f, "{v:?}"),
            },
            Rows::Table(s) => write!(f, "{s}"),
            Rows::Csv(s) => write!(f, "{s}"),
        }
    }
}

/// Output that knows how to print itself in any `Format`.
pub trait Render {
    fn render(&self, format: Format) -> Res<Rows>;
}

impl<T: Tabular> Render for Vec<T> {
    fn render(&self, format: Format) -> Res<Rows> {
        Rows::render(self, format)
    }
}

impl Render for Category {
    fn render(&self, format: Format) -> Res<Rows> {
        Rows::render_one(self, format)
    }
}

impl Render for WithCategory<Transaction> {
    fn render(&self, format: Format) -> Res<Rows> {
        Rows::render_one(self, format)
    }
}

impl Render for WithCategory<Budget> {
    fn render(&self, format: Format) -> Res<Rows> {
        Rows::render_one(self, format)
    }
}

/// Deletes and other outputs that are nothing but an id.
impl Render for String {
    fn render(&self, format: Format) -> Res<Rows> {
        Ok(match format {
            Format::Json => Rows::Json(serde_json::Value::String(self.clone())),
            Format::Table => Rows::Table(self.clone()),
            Format::Csv => Rows::Csv(format!("{self}\n")),
        })
    }
}

/// Builds a Markdown table with columns padded to the widest cell.
pub(crate) fn markdown(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(|c| escape(c)).collect()).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .into_iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.extend(rows.into_iter().map(line));
    out.join("\n")
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

pub(crate) fn csv_text(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Res<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Unable to write CSV header")?;
    for row in rows {
        writer.write_record(&row).context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn category_name(category: Option<&crate::model::CategoryRef>) -> String {
    category.map(|c| c.name().to_string()).unwrap_or_default()
}

impl Tabular for Category {
    fn headers() -> Vec<&'static str> {
        vec!["id", "icon", "name", "type"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.display_icon().to_string(),
            self.name().to_string(),
            self.r#type().to_string(),
        ]
    }
}

impl Tabular for WithCategory<Transaction> {
    fn headers() -> Vec<&'static str> {
        vec!["id", "date", "type", "amount", "category", "description"]
    }

    fn cells(&self) -> Vec<String> {
        let t = self.item();
        vec![
            t.id().to_string(),
            t.date().to_string(),
            t.r#type().to_string(),
            t.amount().to_string(),
            category_name(self.category()),
            t.description().unwrap_or_default().to_string(),
        ]
    }
}

impl Tabular for WithCategory<Budget> {
    fn headers() -> Vec<&'static str> {
        vec!["id", "month", "category", "amount"]
    }

    fn cells(&self) -> Vec<String> {
        let b = self.item();
        vec![
            b.id().to_string(),
            b.month().to_string(),
            category_name(self.category()),
            b.amount().to_string(),
        ]
    }
}

impl Tabular for SpendingShare {
    fn headers() -> Vec<&'static str> {
        vec!["icon", "category", "amount", "percent"]
    }

    fn cells(&self) -> Vec<String> {
        let s = self.spending();
        vec![
            s.icon().to_string(),
            s.name().to_string(),
            s.amount().to_string(),
            self.percent().to_string(),
        ]
    }
}

impl Tabular for MonthSummary {
    fn headers() -> Vec<&'static str> {
        vec!["month", "income", "expenses", "balance"]
    }

    fn cells(&self) -> Vec<String> {
        let totals = self.totals();
        vec![
            self.label().to_string(),
            totals.income().to_string(),
            totals.expenses().to_string(),
            totals.balance().to_string(),
        ]
    }
}

impl Tabular for BudgetProgress {
    fn headers() -> Vec<&'static str> {
        vec![
            "budget", "category", "limit", "spent", "remaining", "used", "over",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.budget_id().to_string(),
            category_name(self.category()),
            self.limit().to_string(),
            self.spent().to_string(),
            self.remaining().to_string(),
            self.percent_used().to_string(),
            if self.over_budget() { "yes" } else { "no" }.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryType;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            user_id: "u1".into(),
            name: name.into(),
            r#type: EntryType::Expense,
            icon: Some("🛒".into()),
            created_at: "2025-10-01T00:00:00.000000Z".into(),
        }
    }

    #[test]
    fn test_markdown_pads_columns() {
        let table = markdown(
            &["a", "bb"],
            vec![vec!["xyz".to_string(), "1".to_string()]].into_iter(),
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| a   | bb |");
        assert_eq!(lines[1], "| --- | -- |");
        assert_eq!(lines[2], "| xyz | 1  |");
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let table = markdown(&["d"], vec![vec!["a|b".to_string()]].into_iter());
        assert!(table.contains("a\\|b"));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let categories = vec![category("c1", "Food, drink")];
        let rows = categories.render(Format::Csv).unwrap();
        let Rows::Csv(text) = rows else {
            panic!("expected csv")
        };
        assert_eq!(text, "id,icon,name,type\nc1,🛒,\"Food, drink\",expense\n");
    }

    #[test]
    fn test_json_single_item_is_an_object() {
        let rows = category("c1", "Food").render(Format::Json).unwrap();
        let Rows::Json(value) = rows else {
            panic!("expected json")
        };
        assert_eq!(value["name"], "Food");
    }

    #[test]
    fn test_empty_table_has_headers() {
        let empty: Vec<Category> = Vec::new();
        let text = empty.render(Format::Table).unwrap().to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("| id"));
    }
}
