use crate::model::{Amount, Month};
use serde::{Deserialize, Serialize};

/// A spending ceiling for one expense category in one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Budget {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) category_id: String,
    /// The limit. Always greater than zero.
    pub(crate) amount: Amount,
    pub(crate) month: Month,
    pub(crate) created_at: String,
}

impl Budget {
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

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}
