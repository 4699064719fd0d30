use std::path::PathBuf;

use thiserror::Error;

/// Main error type for remora operations
#[derive(Error, Debug)]
pub enum RemoraError {
    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("Index not found in {path}: {reason}")]
    IndexNotFound { path: PathBuf, reason: String },

    #[error("Corrupt index data: {0}")]
    CorruptIndex(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for remora operations
pub type Result<T> = std::result::Result<T, RemoraError>;

impl RemoraError {
    /// Check whether this error concerns a single query rather than the
    /// whole run. The batch driver skips the offending query and keeps going.
    pub fn is_query_error(&self) -> bool {
        matches!(self, RemoraError::QueryParse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemoraError::QueryParse("mismatched ')'".to_string());
        assert_eq!(err.to_string(), "Query parse error: mismatched ')'");
    }

    #[test]
    fn test_query_error_classification() {
        assert!(RemoraError::QueryParse("x".to_string()).is_query_error());
        assert!(!RemoraError::CorruptIndex("x".to_string()).is_query_error());
    }
}
