//! Error types for Record Store operations

use thiserror::Error;

/// Errors that can occur during record store operations
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl RecordStoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_timestamp(msg: impl Into<String>) -> Self {
        Self::InvalidTimestamp(msg.into())
    }

    pub fn unsupported_dialect(msg: impl Into<String>) -> Self {
        Self::UnsupportedDialect(msg.into())
    }

    /// Returns true for query or record validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true when the targeted record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, RecordStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = RecordStoreError::validation("id is required");
        assert_eq!(err.to_string(), "Validation error: id is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_display() {
        let err = RecordStoreError::not_found("rec_1");
        assert_eq!(err.to_string(), "Record not found: rec_1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: RecordStoreError = json_err.into();
        assert!(matches!(err, RecordStoreError::Json(_)));
    }
}
