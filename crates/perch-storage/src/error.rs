//! Storage error types shared by the cache tiers.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// A query or command against the backend failed.
    #[error("Query error: {message}")]
    Query {
        /// Description of the failed query.
        message: String,
    },

    /// The platform name cannot be used to namespace a table or key.
    #[error("Invalid platform name: {message}")]
    InvalidPlatform {
        /// Why the platform name was rejected.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Query` error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidPlatform` error.
    #[must_use]
    pub fn invalid_platform(message: impl Into<String>) -> Self {
        Self::InvalidPlatform {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the backend could not be reached.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Infrastructure,
            Self::Query { .. } => ErrorCategory::Query,
            Self::InvalidPlatform { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Infrastructure/connection error.
    Infrastructure,
    /// Backend rejected or failed a command.
    Query,
    /// Validation error.
    Validation,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Query => write!(f, "query"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::connection("refused");
        assert_eq!(err.to_string(), "Connection error: refused");

        let err = StorageError::invalid_platform("Discord");
        assert_eq!(err.to_string(), "Invalid platform name: Discord");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::connection("x").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(StorageError::query("x").category(), ErrorCategory::Query);
        assert_eq!(
            StorageError::invalid_platform("x").category(),
            ErrorCategory::Validation
        );
        assert!(StorageError::connection("x").is_connection());
        assert!(!StorageError::internal("x").is_connection());
    }
}
