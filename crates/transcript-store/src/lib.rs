//! Read-only Postgres access to chat transcript stores.
//!
//! Transcripts live in several independent databases, one per business-unit
//! and bot-type pair ("context"). This crate knows the fixed context set,
//! resolves each context's endpoint, keeps one lazily created pool per
//! context, and runs the analytical queries the monitoring engine needs.
//!
//! # Example
//!
//! ```no_run
//! use transcript_store::{ContextRegistry, EnvEndpoints, TranscriptSource, CONTEXTS};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ContextRegistry::new(EnvEndpoints);
//!
//!     let messages = registry
//!         .session_messages(&CONTEXTS[0], "6281234567890", 1000)
//!         .await?;
//!     println!("{} messages", messages.len());
//!
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod context;
pub mod error;
pub mod latency;
pub mod message;
pub mod models;
pub mod pending;
pub mod registry;
pub mod session;
pub mod source;

pub use context::{
    context_for, BotType, BusinessUnit, Context, ContextBinding, ContextKey, EndpointResolver,
    EnvEndpoints, StaticEndpoints, CONTEXTS,
};
pub use error::{Result, StoreError};
pub use models::{
    ActivityCounts, MessageRow, PendingHead, Role, SessionActivity, SessionHead, TimeWindow,
};
pub use registry::ContextRegistry;
pub use source::TranscriptSource;
