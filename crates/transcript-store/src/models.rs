//! Row models returned by the transcript queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Half-open `[start, end)` UTC interval every windowed query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Speaker role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
    Other,
}

impl Role {
    /// Decode the stored `message->>'type'` value. Anything unknown is `Other`.
    pub fn from_type(value: Option<&str>) -> Self {
        match value {
            Some("human") => Role::Human,
            Some("ai") => Role::Ai,
            _ => Role::Other,
        }
    }
}

/// Distinct sessions and total messages of one context inside a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct ActivityCounts {
    pub session_count: i64,
    pub message_count: i64,
}

/// Per-session aggregate used for the recent-session table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionActivity {
    pub session_id: String,
    /// Latest `created_at` of the session inside the window.
    pub last_activity: DateTime<Utc>,
    pub message_count: i64,
    pub human_count: i64,
    pub ai_count: i64,
}

/// Per-session aggregate plus the latest message, used for session listing.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionHead {
    pub session_id: String,
    pub last_activity: DateTime<Utc>,
    pub message_count: i64,
    /// Raw role of the latest message.
    pub last_type: Option<String>,
    pub last_content: Option<String>,
}

impl SessionHead {
    pub fn last_role(&self) -> Role {
        Role::from_type(self.last_type.as_deref())
    }
}

/// A session whose latest message is human-authored and older than the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PendingHead {
    pub session_id: String,
    pub last_human_at: DateTime<Utc>,
}

/// A single stored transcript message.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub session_id: String,
    /// Raw `message->>'type'` value.
    pub message_type: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    pub fn role(&self) -> Role {
        Role::from_type(self.message_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_role_decoding() {
        assert_eq!(Role::from_type(Some("human")), Role::Human);
        assert_eq!(Role::from_type(Some("ai")), Role::Ai);
        assert_eq!(Role::from_type(Some("system")), Role::Other);
        assert_eq!(Role::from_type(None), Role::Other);
    }

    #[test]
    fn test_window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end);
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }
}
