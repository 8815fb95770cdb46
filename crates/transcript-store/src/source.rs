//! The query-executor seam between transcript storage and aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::{Context, ContextBinding};
use crate::error::{Result, StoreError};
use crate::models::{
    ActivityCounts, MessageRow, PendingHead, SessionActivity, SessionHead, TimeWindow,
};
use crate::registry::ContextRegistry;
use crate::{activity, latency, message, pending, session};

/// Executes the read-only transcript queries against one context.
///
/// Every method returns an empty result, never an error, for a context that
/// has no endpoint. Failures of a bound context (connectivity, timeout, SQL)
/// surface as [`StoreError`] so callers can log and degrade per context.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Every known context with its currently resolved endpoint.
    fn bindings(&self) -> Vec<ContextBinding>;

    async fn activity(&self, context: &Context, window: &TimeWindow) -> Result<ActivityCounts>;

    async fn recent_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
    ) -> Result<Vec<SessionActivity>>;

    async fn session_heads(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SessionHead>>;

    async fn pending_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingHead>>;

    /// Human-to-AI reply gaps in seconds.
    async fn reply_gaps(&self, context: &Context, window: &TimeWindow) -> Result<Vec<f64>>;

    async fn human_contents(
        &self,
        context: &Context,
        window: &TimeWindow,
        cap: i64,
    ) -> Result<Vec<String>>;

    async fn session_messages(
        &self,
        context: &Context,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRow>>;
}

fn query_error(context: &Context) -> impl FnOnce(sqlx::Error) -> StoreError {
    let key = context.key;
    move |source| StoreError::Query {
        context: key,
        source,
    }
}

#[async_trait]
impl TranscriptSource for ContextRegistry {
    fn bindings(&self) -> Vec<ContextBinding> {
        ContextRegistry::bindings(self)
    }

    async fn activity(&self, context: &Context, window: &TimeWindow) -> Result<ActivityCounts> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(ActivityCounts::default());
        };
        activity::count_activity(&pool, window)
            .await
            .map_err(query_error(context))
    }

    async fn recent_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
    ) -> Result<Vec<SessionActivity>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        session::recent_sessions(&pool, window, limit)
            .await
            .map_err(query_error(context))
    }

    async fn session_heads(
        &self,
        context: &Context,
        window: &TimeWindow,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SessionHead>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        session::session_heads(&pool, window, limit, offset)
            .await
            .map_err(query_error(context))
    }

    async fn pending_sessions(
        &self,
        context: &Context,
        window: &TimeWindow,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingHead>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        pending::pending_sessions(&pool, window, cutoff, limit)
            .await
            .map_err(query_error(context))
    }

    async fn reply_gaps(&self, context: &Context, window: &TimeWindow) -> Result<Vec<f64>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        latency::reply_gaps(&pool, window)
            .await
            .map_err(query_error(context))
    }

    async fn human_contents(
        &self,
        context: &Context,
        window: &TimeWindow,
        cap: i64,
    ) -> Result<Vec<String>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        message::human_contents(&pool, window, cap)
            .await
            .map_err(query_error(context))
    }

    async fn session_messages(
        &self,
        context: &Context,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRow>> {
        let Some(pool) = self.pool_for(context).await? else {
            return Ok(Vec::new());
        };
        message::session_messages(&pool, session_id, limit)
            .await
            .map_err(query_error(context))
    }
}
