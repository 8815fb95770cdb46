//! Cross-context aggregation engine for the chat transcript monitor.
//!
//! The engine takes an operator's [`Filter`], resolves it to a UTC
//! [`TimeWindow`](transcript_store::TimeWindow), fans every analytical query
//! out to the active contexts of a [`TranscriptSource`], and merges the
//! per-context answers into the dashboard views: activity totals, recent
//! sessions, pending sessions, reply latency percentiles and top tokens.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use monitor_core::{AggregationEngine, EngineSettings, Filter};
//! use transcript_store::{ContextRegistry, EnvEndpoints};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ContextRegistry::new(EnvEndpoints));
//!     let engine = AggregationEngine::new(registry, EngineSettings::default());
//!
//!     let dashboard = engine.dashboard(&Filter::default(), Utc::now()).await?;
//!     println!("{} sessions", dashboard.activity.total_sessions);
//!
//!     Ok(())
//! }
//! ```
//!
//! [`TranscriptSource`]: transcript_store::TranscriptSource

pub mod engine;
pub mod error;
pub mod filter;
pub mod merge;
pub mod session_id;
pub mod settings;
pub mod stats;
pub mod status;
pub mod tokens;
pub mod views;
pub mod window;

#[cfg(test)]
mod testing;

pub use engine::{AggregationEngine, Partial};
pub use error::{EngineError, Result};
pub use filter::{DatePreset, Filter, FilterParams};
pub use session_id::CompositeSessionId;
pub use settings::EngineSettings;
pub use status::SessionStatus;
pub use tokens::TokenCount;
pub use views::{
    ActivitySummary, Dashboard, LatencyStats, MessageView, PendingSession, RecentSession,
    SessionListItem, SessionRow,
};
pub use window::WindowResolver;
