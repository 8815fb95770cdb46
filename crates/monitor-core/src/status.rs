//! Session status labels.

use std::collections::HashSet;

use serde::Serialize;

use crate::views::RecentSession;

/// Operator-facing status of a recent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Overdue,
    Open,
    #[serde(rename = "Needs attention")]
    NeedsAttention,
    Closed,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Overdue => "Overdue",
            SessionStatus::Open => "Open",
            SessionStatus::NeedsAttention => "Needs attention",
            SessionStatus::Closed => "Closed",
        }
    }
}

/// Derive a session's status. The first matching rule wins:
///
/// 1. pending ⇒ `Overdue`
/// 2. human messages but no ai messages ⇒ `Open`
/// 3. more than `busy_threshold` messages, or both human and ai ⇒ `NeedsAttention`
/// 4. otherwise `Closed`
pub fn derive_status(
    session: &RecentSession,
    pending_ids: &HashSet<&str>,
    busy_threshold: i64,
) -> SessionStatus {
    if pending_ids.contains(session.id.as_str()) {
        SessionStatus::Overdue
    } else if session.ai_count == 0 && session.human_count > 0 {
        SessionStatus::Open
    } else if session.message_count > busy_threshold
        || (session.human_count > 0 && session.ai_count > 0)
    {
        SessionStatus::NeedsAttention
    } else {
        SessionStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use transcript_store::{BotType, BusinessUnit};

    fn session(message_count: i64, human_count: i64, ai_count: i64) -> RecentSession {
        RecentSession {
            id: "AMG:sales:s1".to_string(),
            session_id: "s1".to_string(),
            office: BusinessUnit::Amg,
            bot: BotType::Sales,
            context_label: "AMG Sales".to_string(),
            last_activity: Utc::now(),
            message_count,
            human_count,
            ai_count,
        }
    }

    #[test]
    fn test_pending_wins_over_everything() {
        let pending = HashSet::from(["AMG:sales:s1"]);
        assert_eq!(derive_status(&session(30, 10, 20), &pending, 20), SessionStatus::Overdue);
    }

    #[test]
    fn test_human_only_is_open() {
        assert_eq!(derive_status(&session(3, 3, 0), &HashSet::new(), 20), SessionStatus::Open);
    }

    #[test]
    fn test_conversation_needs_attention() {
        assert_eq!(
            derive_status(&session(4, 2, 2), &HashSet::new(), 20),
            SessionStatus::NeedsAttention
        );
    }

    #[test]
    fn test_busy_session_needs_attention() {
        // Only "other" messages, but many of them.
        assert_eq!(
            derive_status(&session(21, 0, 0), &HashSet::new(), 20),
            SessionStatus::NeedsAttention
        );
    }

    #[test]
    fn test_ai_only_is_closed() {
        assert_eq!(derive_status(&session(2, 0, 2), &HashSet::new(), 20), SessionStatus::Closed);
    }
}
