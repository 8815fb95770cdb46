//! In-memory transcript source for engine tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use transcript_store::{
    ActivityCounts, Context, ContextBinding, ContextKey, MessageRow, PendingHead, Role,
    SessionActivity, SessionHead, StoreError, TimeWindow, TranscriptSource, CONTEXTS,
};

#[derive(Debug, Clone)]
struct Event {
    id: i64,
    session_id: String,
    message_type: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Event {
    fn role(&self) -> Role {
        Role::from_type(Some(&self.message_type))
    }
}

/// Mirrors the Postgres queries over events held in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    events: HashMap<ContextKey, Vec<Event>>,
    configured: HashSet<ContextKey>,
    failing: HashSet<ContextKey>,
    next_id: i64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to an endpoint without adding any messages.
    pub fn configure(mut self, key: ContextKey) -> Self {
        self.configured.insert(key);
        self
    }

    /// Bind `key` but make every query against it fail.
    pub fn failing(mut self, key: ContextKey) -> Self {
        self.configured.insert(key);
        self.failing.insert(key);
        self
    }

    /// Append a message; binds the context.
    pub fn message(
        mut self,
        key: ContextKey,
        session_id: &str,
        message_type: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.next_id += 1;
        self.configured.insert(key);
        self.events.entry(key).or_default().push(Event {
            id: self.next_id,
            session_id: session_id.to_string(),
            message_type: message_type.to_string(),
            content: content.to_string(),
            created_at,
        });
        self
    }

    fn check(&self, context: &Context) -> transcript_store::Result<bool> {
        if self.failing.contains(&context.key) {
            return Err(StoreError::Query {
                context: context.key,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(self.configured.contains(&context.key))
    }

    /// In-window events grouped by session, each group in chronological order.
    fn sessions(&self, context: &Context, window: &TimeWindow) -> BTreeMap<String, Vec<Event>> {
        let mut sessions: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in self.events.get(&context.key).into_iter().flatten() {
            if window.contains(event.created_at) {
                sessions
                    .entry(event.session_id.clone())
                    .or_default()
                    .push(event.clone());
            }
        }
        for events in sessions.values_mut() {
            events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        }
        sessions
    }
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl TranscriptSource for MemorySource {
    fn bindings(&self) -> Vec<ContextBinding> {
        CONTEXTS
            .into_iter()
            .map(|context| ContextBinding {
                context,
                endpoint: self
                    .configured
                    .contains(&context.key)
                    .then(|| format!("memory://{}", context.key)),
            })
            .collect()
    }

    async fn activity(
        &self,
        context: &Context,
        window: &TimeWindow,
    ) -> transcript_store::Result<ActivityCounts> {
        if !self.check(context)? {
            return Ok(ActivityCounts::default());
        }
        let sessions = self.sessions(context, window);
        Ok(ActivityCounts {
            session_count: sessions.len() as i64,
            message_count: sessions.values().map(|e| e.len() as i64).sum(),
        })
    }

    async fn recent_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
    ) -> transcript_store::Result<Vec<SessionActivity>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut rows: Vec<SessionActivity> = self
            .sessions(context, window)
            .into_iter()
            .filter_map(|(session_id, events)| {
                let last = events.iter().map(|e| e.created_at).max()?;
                Some(SessionActivity {
                    session_id,
                    last_activity: last,
                    message_count: events.len() as i64,
                    human_count: events.iter().filter(|e| e.role() == Role::Human).count() as i64,
                    ai_count: events.iter().filter(|e| e.role() == Role::Ai).count() as i64,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.last_activity
                .cmp(&a.last_activity)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(page(rows, limit, 0))
    }

    async fn session_heads(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
        offset: i64,
    ) -> transcript_store::Result<Vec<SessionHead>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut rows: Vec<SessionHead> = self
            .sessions(context, window)
            .into_iter()
            .filter_map(|(session_id, events)| {
                let last = events.last()?;
                Some(SessionHead {
                    session_id,
                    last_activity: last.created_at,
                    message_count: events.len() as i64,
                    last_type: Some(last.message_type.clone()),
                    last_content: Some(last.content.clone()),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.last_activity
                .cmp(&a.last_activity)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(page(rows, limit, offset))
    }

    async fn pending_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> transcript_store::Result<Vec<PendingHead>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut rows: Vec<PendingHead> = self
            .sessions(context, window)
            .into_iter()
            .filter_map(|(session_id, events)| {
                let last = events.last()?;
                (last.role() == Role::Human && last.created_at < cutoff).then(|| PendingHead {
                    session_id,
                    last_human_at: last.created_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.last_human_at
                .cmp(&a.last_human_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(page(rows, limit, 0))
    }

    async fn reply_gaps(
        &self,
        context: &Context,
        window: &TimeWindow,
    ) -> transcript_store::Result<Vec<f64>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut gaps = Vec::new();
        for events in self.sessions(context, window).values() {
            for pair in events.windows(2) {
                let (previous, current) = (&pair[0], &pair[1]);
                if previous.role() == Role::Human
                    && current.role() == Role::Ai
                    && current.created_at > previous.created_at
                {
                    let millis = (current.created_at - previous.created_at).num_milliseconds();
                    gaps.push(millis as f64 / 1000.0);
                }
            }
        }
        Ok(gaps)
    }

    async fn human_contents(
        &self,
        context: &Context,
        window: &TimeWindow,
        cap: i64,
    ) -> transcript_store::Result<Vec<String>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut events: Vec<Event> = self
            .events
            .get(&context.key)
            .into_iter()
            .flatten()
            .filter(|e| window.contains(e.created_at) && e.role() == Role::Human)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page(events, cap, 0).into_iter().map(|e| e.content).collect())
    }

    async fn session_messages(
        &self,
        context: &Context,
        session_id: &str,
        limit: i64,
    ) -> transcript_store::Result<Vec<MessageRow>> {
        if !self.check(context)? {
            return Ok(Vec::new());
        }
        let mut events: Vec<Event> = self
            .events
            .get(&context.key)
            .into_iter()
            .flatten()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page(events, limit, 0)
            .into_iter()
            .map(|e| MessageRow {
                id: e.id,
                session_id: e.session_id,
                message_type: Some(e.message_type),
                content: Some(e.content),
                created_at: e.created_at,
            })
            .collect())
    }
}
