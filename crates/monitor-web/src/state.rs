//! Application state shared across handlers.

use std::sync::Arc;

use monitor_core::AggregationEngine;
use transcript_store::TranscriptSource;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Aggregation engine over every configured context.
    pub engine: Arc<AggregationEngine<dyn TranscriptSource>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: AggregationEngine<dyn TranscriptSource>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
