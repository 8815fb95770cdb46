//! Aggregation error types.

use thiserror::Error;
use transcript_store::StoreError;

/// Errors surfaced by the aggregation engine.
///
/// A single failing context is not an error: it is logged and contributes
/// nothing. Only a request where every active context failed is reported.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Every active context failed every query of the request.
    #[error("all {attempted} active transcript sources failed")]
    AllSourcesFailed { attempted: usize },

    /// A single-context read failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, EngineError>;
