//! Error types for the reconciliation engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciliation engine
#[derive(Error, Debug)]
pub enum Error {
    /// Resolver-related errors (unreachable, malformed snapshot)
    #[error("resolver error: {0}")]
    Resolver(String),

    /// The per-domain snapshot fetch exceeded its deadline
    #[error("resolver timed out after {0}s")]
    ResolverTimeout(u64),

    /// Persistence gateway errors
    #[error("gateway error: {0}")]
    Gateway(String),

    /// A field comparator failed on unexpected input
    #[error("comparator error ({category}): {message}")]
    Comparator {
        /// The category the comparator was diffing
        category: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors (file gateway, fixture resolver)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Domain not tracked by the gateway
    #[error("domain not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a gateway error
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create a comparator error
    pub fn comparator(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Comparator {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
