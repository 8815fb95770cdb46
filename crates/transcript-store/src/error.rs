//! Transcript store error types.

use thiserror::Error;

use crate::context::ContextKey;

/// Errors that can occur while querying a context's transcript store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLx error (connection, timeout, malformed query, decode).
    #[error("query against {context} failed: {source}")]
    Query {
        context: ContextKey,
        #[source]
        source: sqlx::Error,
    },

    /// The configured endpoint could not be turned into a pool.
    #[error("invalid endpoint for {context}: {source}")]
    InvalidEndpoint {
        context: ContextKey,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// The context the failure belongs to.
    pub fn context(&self) -> ContextKey {
        match self {
            StoreError::Query { context, .. } | StoreError::InvalidEndpoint { context, .. } => {
                *context
            }
        }
    }
}

/// Result type for transcript store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
