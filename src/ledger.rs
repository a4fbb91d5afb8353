use crate::config::validate_user;
use crate::error::{ErrorType, IntoResult};
use crate::store::{self, Store};
use crate::{Config, Mode, Result};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs to run: the `Store`, the user whose data it reads and writes, and
/// the report settings from the config file.
///
/// A `Ledger` is cheap to clone. Every command takes one, so there is no global client.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
    user: String,
    trend_months: u32,
    recent_limit: u32,
}

impl Ledger {
    /// Opens the store selected by `mode` and scopes it to `user`, or to the configured default
    /// user when `user` is `None`.
    pub async fn open(config: &Config, mode: Mode, user: Option<&str>) -> Result<Self> {
        let user = user.unwrap_or(config.default_user()).to_string();
        validate_user(&user).pub_result(ErrorType::Request)?;
        let store = store::open(config, mode, &user)
            .await
            .pub_result(ErrorType::Database)?;
        debug!("Opened {mode:?} ledger for user {user}");
        Ok(Self::new(
            store,
            user,
            config.trend_months(),
            config.recent_limit(),
        ))
    }

    pub(crate) fn new(
        store: Arc<dyn Store>,
        user: impl Into<String>,
        trend_months: u32,
        recent_limit: u32,
    ) -> Self {
        Self {
            store,
            user: user.into(),
            trend_months,
            recent_limit,
        }
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// The user every read and write is scoped to.
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn trend_months(&self) -> u32 {
        self.trend_months
    }

    pub fn recent_limit(&self) -> u32 {
        self.recent_limit
    }
}

impl Debug for Ledger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("user", &self.user)
            .field("trend_months", &self.trend_months)
            .field("recent_limit", &self.recent_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_uses_default_user() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), Some("alice".into())).await.unwrap();
        let ledger = Ledger::open(&config, Mode::Sqlite, None).await.unwrap();
        assert_eq!(ledger.user(), "alice");
        assert_eq!(ledger.trend_months(), 6);
        assert_eq!(ledger.recent_limit(), 5);
    }

    #[tokio::test]
    async fn test_open_with_user_override() {
        let config = Config::detached("/nonexistent/fintrack", "demo");
        let ledger = Ledger::open(&config, Mode::Memory, Some("bob"))
            .await
            .unwrap();
        assert_eq!(ledger.user(), "bob");
        let categories = ledger.store().categories("bob", None).await.unwrap();
        assert!(!categories.is_empty());
    }

    #[tokio::test]
    async fn test_blank_user_is_a_request_error() {
        let config = Config::detached("/nonexistent/fintrack", "demo");
        let err = Ledger::open(&config, Mode::Memory, Some("  "))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[test]
    fn test_debug_hides_store() {
        let ledger = Ledger::new(Arc::new(MemoryStore::empty()), "u1", 6, 5);
        let debug = format!("{ledger:?}");
        assert!(debug.contains("u1"));
    }
}
