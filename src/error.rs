//! Error types.
//!
//! Internally the crate uses `anyhow` (`Res<T>`). Public command functions return `Result<T>`,
//! whose `Error` carries an `ErrorType` so that callers (the CLI and the MCP server) can tell a
//! bad request apart from a failing database.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of an `Error`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration or home directory could not be created, read or parsed.
    Config,
    /// A write to the data store failed.
    Database,
    /// The data behind a report could not be fetched from the data store.
    DataUnavailable,
    /// The request itself was invalid, e.g. a missing category or a negative amount.
    Request,
    /// The MCP service could not be started or failed while running.
    Service,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, source: anyhow::Error) -> Self {
        Self { error_type, source }
    }

    /// The broad category of the error.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::new(ErrorType::Internal, e)
    }
}

/// Converts an internal result into a public `Result` tagged with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_display_includes_type_and_context() {
        let res: Res<()> = Err(anyhow!("disk on fire")).map_err(|e| e.context("Unable to save"));
        let err = res.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
        let message = err.to_string();
        assert!(message.starts_with("database error:"), "{message}");
        assert!(message.contains("Unable to save"));
        assert!(message.contains("disk on fire"));
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: Error = anyhow!("boom").into();
        assert_eq!(err.error_type(), ErrorType::Internal);
    }

    #[test]
    fn test_error_type_round_trips_through_str() {
        let t: ErrorType = "data_unavailable".parse().unwrap();
        assert_eq!(t, ErrorType::DataUnavailable);
        assert_eq!(t.to_string(), "data_unavailable");
    }
}
