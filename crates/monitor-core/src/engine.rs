//! The cross-context aggregation engine.
//!
//! Each request fans the same query out to every active context
//! concurrently, waits for all of them, and then runs the synchronous merge
//! functions on the collected results. A context that fails is logged and
//! left out of that sub-query; the others still contribute.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};
use transcript_store::{context_for, Context, ContextKey, TimeWindow, TranscriptSource};

use crate::error::{EngineError, Result};
use crate::filter::Filter;
use crate::merge::{
    apply_search, merge_latency, merge_pending, merge_recent, merge_session_heads, merge_tokens,
    pending_cutoff, sum_activity,
};
use crate::session_id::CompositeSessionId;
use crate::settings::EngineSettings;
use crate::status::derive_status;
use crate::tokens::TokenCount;
use crate::views::{
    ActivitySummary, Dashboard, LatencyStats, MessageView, PendingSession, RecentSession,
    SessionListItem, SessionRow,
};
use crate::window::WindowResolver;

/// Result of one fan-out: the merged value plus which contexts failed.
#[derive(Debug, Clone)]
pub struct Partial<T> {
    pub value: T,
    /// Contexts whose query failed, in context order.
    pub failed: Vec<ContextKey>,
    /// Number of contexts queried.
    pub attempted: usize,
}

impl<T> Partial<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Partial<U> {
        Partial {
            value: f(self.value),
            failed: self.failed,
            attempted: self.attempted,
        }
    }

    /// At least one context was queried and none of them answered.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed.len() == self.attempted
    }
}

/// Run `query` against every context concurrently and collect the answers
/// in context order. Failures are logged and dropped.
async fn fan_out<'a, T, F, Fut>(
    contexts: &'a [Context],
    operation: &'static str,
    query: F,
) -> Partial<Vec<(Context, T)>>
where
    F: Fn(&'a Context) -> Fut,
    Fut: Future<Output = transcript_store::Result<T>>,
{
    let outcomes = join_all(contexts.iter().map(|context| {
        let pending = query(context);
        async move { (context, pending.await) }
    }))
    .await;

    let mut value = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for (context, outcome) in outcomes {
        match outcome {
            Ok(rows) => value.push((*context, rows)),
            Err(err) => {
                warn!(
                    context = %context.key,
                    operation,
                    error = %err,
                    "Context query failed, continuing without it"
                );
                failed.push(context.key);
            }
        }
    }

    Partial {
        value,
        failed,
        attempted: contexts.len(),
    }
}

fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Aggregates transcripts across every configured context.
pub struct AggregationEngine<S: ?Sized> {
    source: Arc<S>,
    settings: EngineSettings,
    windows: WindowResolver,
}

impl<S> AggregationEngine<S>
where
    S: TranscriptSource + ?Sized,
{
    pub fn new(source: Arc<S>, settings: EngineSettings) -> Self {
        let windows = WindowResolver::new(settings.display_offset, settings.default_range_days);
        Self {
            source,
            settings,
            windows,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The `[start, end)` window a filter selects at `now`.
    pub fn resolve_window(&self, filter: &Filter, now: DateTime<Utc>) -> TimeWindow {
        self.windows.resolve(filter, now)
    }

    /// Configured contexts selected by the filter, in fixed context order.
    pub fn active_contexts(&self, filter: &Filter) -> Vec<Context> {
        self.source
            .bindings()
            .into_iter()
            .filter(|binding| binding.is_configured() && filter.matches(&binding.context))
            .map(|binding| binding.context)
            .collect()
    }

    /// Split every context into (configured, missing).
    pub fn context_overview(&self) -> (Vec<Context>, Vec<Context>) {
        let (configured, missing): (Vec<_>, Vec<_>) = self
            .source
            .bindings()
            .into_iter()
            .partition(|binding| binding.is_configured());
        (
            configured.into_iter().map(|b| b.context).collect(),
            missing.into_iter().map(|b| b.context).collect(),
        )
    }

    /// Build the full dashboard: all five sub-aggregations run concurrently.
    pub async fn dashboard(&self, filter: &Filter, now: DateTime<Utc>) -> Result<Dashboard> {
        let window = self.resolve_window(filter, now);
        let contexts = self.active_contexts(filter);
        let (configured, missing) = self.context_overview();

        debug!(
            contexts = contexts.len(),
            start = %window.start,
            end = %window.end,
            "Building dashboard"
        );

        let (activity, recent, pending, latency, tokens) = tokio::join!(
            self.activity_summary(&contexts, &window),
            self.recent_sessions(&contexts, &window),
            self.pending_sessions(&contexts, &window, now),
            self.response_latency(&contexts, &window),
            self.top_tokens(&contexts, &window),
        );

        let everything_failed = activity.all_failed()
            && recent.all_failed()
            && pending.all_failed()
            && latency.all_failed()
            && tokens.all_failed();
        if everything_failed {
            return Err(EngineError::AllSourcesFailed {
                attempted: contexts.len(),
            });
        }

        let failed: Vec<ContextKey> = contexts
            .iter()
            .map(|context| context.key)
            .filter(|key| {
                activity.failed.contains(key)
                    || recent.failed.contains(key)
                    || pending.failed.contains(key)
                    || latency.failed.contains(key)
                    || tokens.failed.contains(key)
            })
            .collect();

        let pending_ids: HashSet<&str> = pending.value.iter().map(|s| s.id.as_str()).collect();
        let sessions = apply_search(recent.value, filter.search.as_deref(), |s| {
            s.session_id.as_str()
        })
        .into_iter()
        .map(|session| SessionRow {
            status: derive_status(&session, &pending_ids, self.settings.busy_session_threshold),
            session,
        })
        .collect();

        Ok(Dashboard {
            filter: filter.clone(),
            window,
            activity: activity.value,
            latency: latency.value,
            sessions,
            pending: pending.value,
            top_tokens: tokens.value,
            configured,
            missing,
            failed,
        })
    }

    /// Distinct sessions and messages, summed across contexts.
    pub async fn activity_summary(
        &self,
        contexts: &[Context],
        window: &TimeWindow,
    ) -> Partial<ActivitySummary> {
        fan_out(contexts, "activity", |context| {
            self.source.activity(context, window)
        })
        .await
        .map(|rows| sum_activity(&rows))
    }

    /// The most recently active sessions across contexts.
    ///
    /// Each context returns its own top `dashboard_page_size`; see
    /// [`merge_recent`] for why the merged list is an approximation.
    pub async fn recent_sessions(
        &self,
        contexts: &[Context],
        window: &TimeWindow,
    ) -> Partial<Vec<RecentSession>> {
        let limit = self.settings.dashboard_page_size;
        fan_out(contexts, "recent_sessions", |context| {
            self.source.recent_sessions(context, window, sql_limit(limit))
        })
        .await
        .map(|rows| merge_recent(&rows, limit))
    }

    /// Sessions whose latest message is human and older than the threshold.
    pub async fn pending_sessions(
        &self,
        contexts: &[Context],
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Partial<Vec<PendingSession>> {
        let limit = self.settings.dashboard_page_size;
        let cutoff = pending_cutoff(now, self.settings.pending_threshold);
        fan_out(contexts, "pending_sessions", |context| {
            self.source.pending_sessions(context, window, cutoff, sql_limit(limit))
        })
        .await
        .map(|rows| merge_pending(&rows, limit))
    }

    /// Median and p95 human-to-AI reply time.
    pub async fn response_latency(
        &self,
        contexts: &[Context],
        window: &TimeWindow,
    ) -> Partial<LatencyStats> {
        fan_out(contexts, "reply_gaps", |context| {
            self.source.reply_gaps(context, window)
        })
        .await
        .map(|rows| merge_latency(&rows))
    }

    /// Most frequent words in human messages.
    pub async fn top_tokens(
        &self,
        contexts: &[Context],
        window: &TimeWindow,
    ) -> Partial<Vec<TokenCount>> {
        let cap = self.settings.token_scan_cap;
        fan_out(contexts, "human_contents", |context| {
            self.source.human_contents(context, window, cap)
        })
        .await
        .map(|rows| merge_tokens(&rows, self.settings.top_token_count))
    }

    /// One page of the session listing.
    pub async fn session_list(
        &self,
        filter: &Filter,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionListItem>> {
        let window = self.resolve_window(filter, now);
        let contexts = self.active_contexts(filter);
        let limit = self.settings.listing_page_size;
        // Every context skips the same number of its own rows, so pages past
        // the first are approximate in the same way as the recent list.
        let offset = (i64::from(filter.page) - 1) * sql_limit(limit);

        let partial = fan_out(&contexts, "session_heads", |context| {
            self.source
                .session_heads(context, &window, sql_limit(limit), offset)
        })
        .await;

        if partial.all_failed() {
            return Err(EngineError::AllSourcesFailed {
                attempted: partial.attempted,
            });
        }

        Ok(merge_session_heads(
            &partial.value,
            now,
            self.settings.pending_threshold,
            limit,
            filter.search.as_deref(),
        ))
    }

    /// Messages of one session in chronological order.
    ///
    /// A malformed id, or one naming an unconfigured context, yields an
    /// empty list.
    pub async fn session_messages(&self, composite_id: &str) -> Result<Vec<MessageView>> {
        let Some(id) = CompositeSessionId::parse(composite_id) else {
            debug!(composite_id, "Ignoring malformed session id");
            return Ok(Vec::new());
        };

        let configured = self
            .source
            .bindings()
            .iter()
            .any(|binding| binding.context.key == id.key && binding.is_configured());
        if !configured {
            return Ok(Vec::new());
        }

        let context = context_for(id.key);
        let rows = self
            .source
            .session_messages(&context, &id.session_id, self.settings.message_cap)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MessageView {
                role: row.role(),
                id: row.id,
                content: row.content.unwrap_or_default(),
                created_at: row.created_at,
            })
            .collect())
    }
}
