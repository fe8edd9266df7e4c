//! Structured error types for devflow-db.
//!
//! Uses `thiserror` for composable errors at the library surface; the binary
//! crate (devflow-cli) uses `anyhow` at its edge. `DbError` is `Clone`
//! because a single failed connection attempt is broadcast to every caller
//! that joined it.

use thiserror::Error;

/// Main error type for devflow-db operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Required connection string missing. Fatal; dependent operations must
    /// not start, and no handshake is attempted.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Transport or handshake failure while opening a session. The attempt
    /// is cleared, so the next call retries from scratch.
    #[error("connection error: {reason}")]
    Connection { reason: String },
}

/// Result type alias for devflow-db operations
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a connection error
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Whether a later call may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_retryable() {
        assert!(DbError::connection("store unreachable").is_retryable());
        assert!(!DbError::configuration("MONGO_URI must be set").is_retryable());
    }

    #[test]
    fn display_includes_the_reason() {
        let err = DbError::connection("handshake rejected");
        assert_eq!(err.to_string(), "connection error: handshake rejected");
    }
}
