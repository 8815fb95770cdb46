//! Composite `{unit}:{bot}:{session}` identifiers.

use std::fmt;

use transcript_store::{BotType, BusinessUnit, ContextKey};

/// Identifies a session across every context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeSessionId {
    pub key: ContextKey,
    /// Session id as stored in the context; may itself contain `:`.
    pub session_id: String,
}

impl CompositeSessionId {
    pub fn new(key: ContextKey, session_id: impl Into<String>) -> Self {
        Self {
            key,
            session_id: session_id.into(),
        }
    }

    /// Parse a composite id. Returns `None` for fewer than three parts or an
    /// unknown unit or bot code.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let unit = BusinessUnit::from_code(parts.next()?)?;
        let bot = BotType::from_code(parts.next()?)?;
        let session_id = parts.next()?;
        Some(Self::new(ContextKey::new(unit, bot), session_id))
    }
}

impl fmt::Display for CompositeSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.session_id)
    }
}
