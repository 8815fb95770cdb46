//! Aggregated views handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use transcript_store::{BotType, BusinessUnit, Context, ContextKey, Role, TimeWindow};

use crate::filter::Filter;
use crate::status::SessionStatus;
use crate::tokens::TokenCount;

/// Session and message totals across the active contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub total_sessions: i64,
    pub total_messages: i64,
}

/// A row of the recent-session table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSession {
    /// Composite `{unit}:{bot}:{session}` id.
    pub id: String,
    pub session_id: String,
    pub office: BusinessUnit,
    pub bot: BotType,
    pub context_label: String,
    pub last_activity: DateTime<Utc>,
    pub message_count: i64,
    pub human_count: i64,
    pub ai_count: i64,
}

/// A session awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSession {
    pub id: String,
    pub session_id: String,
    pub office: BusinessUnit,
    pub bot: BotType,
    pub context_label: String,
    pub last_human_at: DateTime<Utc>,
}

/// Reply latency estimates in seconds; `None` when no context had samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyStats {
    pub median_seconds: Option<f64>,
    pub p95_seconds: Option<f64>,
}

impl LatencyStats {
    pub fn has_samples(&self) -> bool {
        self.median_seconds.is_some() && self.p95_seconds.is_some()
    }
}

/// A recent session with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    #[serde(flatten)]
    pub session: RecentSession,
    pub status: SessionStatus,
}

/// An entry of the paginated session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListItem {
    pub id: String,
    pub session_id: String,
    pub office: BusinessUnit,
    pub bot: BotType,
    pub last_activity: DateTime<Utc>,
    pub last_speaker: Role,
    pub last_message_snippet: String,
    pub message_count: i64,
    pub is_overdue: bool,
}

/// One message of a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the dashboard page shows for one filter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub filter: Filter,
    pub window: TimeWindow,
    pub activity: ActivitySummary,
    pub latency: LatencyStats,
    pub sessions: Vec<SessionRow>,
    pub pending: Vec<PendingSession>,
    pub top_tokens: Vec<TokenCount>,
    /// Contexts with an endpoint, whether or not the filter selects them.
    pub configured: Vec<Context>,
    /// Contexts without an endpoint.
    pub missing: Vec<Context>,
    /// Active contexts that failed at least one query.
    pub failed: Vec<ContextKey>,
}
