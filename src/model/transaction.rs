use crate::model::{Amount, CategoryRef, EntryType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated monetary record. `amount` is never negative; `type` carries the direction and
/// always matches the type of the referenced category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) category_id: String,
    pub(crate) amount: Amount,
    pub(crate) description: Option<String>,
    pub(crate) date: NaiveDate,
    #[serde(rename = "type")]
    pub(crate) r#type: EntryType,
    /// Only used to break ties between transactions on the same date when listing.
    pub(crate) created_at: String,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn r#type(&self) -> EntryType {
        self.r#type
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// The slice of a transaction that the monthly aggregations consume: its amount, its direction
/// and its category, if the category still resolves.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Entry {
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) r#type: EntryType,
    pub(crate) category: Option<CategoryRef>,
}

impl Entry {
    pub fn new(amount: Amount, r#type: EntryType, category: Option<CategoryRef>) -> Self {
        Self {
            amount,
            r#type,
            category,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn r#type(&self) -> EntryType {
        self.r#type
    }

    pub fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }
}
