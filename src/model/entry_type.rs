use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The direction of money for a category or transaction.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money coming in.
    Income,
    /// Money going out.
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(EntryType);
serde_plain::derive_fromstr_from_deserialize!(EntryType);

#[test]
fn test_entry_type_strings() {
    assert_eq!(EntryType::Income.to_string(), "income");
    assert_eq!("expense".parse::<EntryType>().unwrap(), EntryType::Expense);
    assert!("transfer".parse::<EntryType>().is_err());
}
