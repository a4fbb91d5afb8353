use crate::model::EntryType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The generic marker shown for a category that has no icon of its own.
pub const DEFAULT_ICON: &str = "📊";

/// A user-defined grouping of transactions with a direction (income or expense).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) r#type: EntryType,
    pub(crate) icon: Option<String>,
    pub(crate) created_at: String,
}

impl Category {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn r#type(&self) -> EntryType {
        self.r#type
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// The icon, or `DEFAULT_ICON` if none was set.
    pub fn display_icon(&self) -> &str {
        display_icon(self.icon())
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// The slice of this category that is joined onto transactions and budgets.
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id.clone(),
            name: self.name.clone(),
            r#type: self.r#type,
            icon: self.icon.clone(),
        }
    }
}

/// The category fields joined onto a transaction or budget when it is read.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRef {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) r#type: EntryType,
    pub(crate) icon: Option<String>,
}

impl CategoryRef {
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

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn r#type(&self) -> EntryType {
        self.r#type
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn display_icon(&self) -> &str {
        display_icon(self.icon())
    }
}

/// A row read together with its category. The category is `None` when the reference no longer
/// resolves, and callers must handle that case.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct WithCategory<T> {
    #[serde(flatten)]
    pub(crate) item: T,
    pub(crate) category: Option<CategoryRef>,
}

impl<T> WithCategory<T> {
    pub fn new(item: T, category: Option<CategoryRef>) -> Self {
        Self { item, category }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

pub(crate) fn display_icon(icon: Option<&str>) -> &str {
    match icon {
        Some(icon) if !icon.trim().is_empty() => icon,
        _ => DEFAULT_ICON,
    }
}

#[test]
fn test_display_icon_defaults() {
    let mut category = CategoryRef::new("c1", "Rent", EntryType::Expense, None);
    assert_eq!(category.display_icon(), DEFAULT_ICON);
    category.icon = Some("  ".into());
    assert_eq!(category.display_icon(), DEFAULT_ICON);
    category.icon = Some("🏠".into());
    assert_eq!(category.display_icon(), "🏠");
}

#[test]
fn test_with_category_serializes_flat() {
    let row = WithCategory::new(
        serde_json::json!({"id": "t1"}),
        Some(CategoryRef::new("c1", "Food", EntryType::Expense, None)),
    );
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["id"], "t1");
    assert_eq!(json["category"]["name"], "Food");
    assert_eq!(json["category"]["type"], "expense");
}
