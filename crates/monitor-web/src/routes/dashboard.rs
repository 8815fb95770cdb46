//! Dashboard routes.

use askama::Template;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{FixedOffset, Utc};
use monitor_core::{Dashboard, Filter, FilterParams, SessionStatus};
use transcript_store::context_for;

use crate::display::{format_count, format_seconds, format_timestamp};
use crate::error::Result;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub filter: FilterView,
    pub window_label: String,
    pub total_sessions: String,
    pub total_messages: String,
    pub median_latency: String,
    pub p95_latency: String,
    pub sessions: Vec<SessionView>,
    pub pending: Vec<PendingView>,
    pub tokens: Vec<TokenView>,
    /// Contexts without an endpoint.
    pub missing: Vec<MissingContext>,
    /// Labels of contexts that failed a query.
    pub failed: Vec<String>,
}

/// Current filter values echoed back into the form.
pub struct FilterView {
    pub office: &'static str,
    pub bot: &'static str,
    pub range: &'static str,
    pub from: String,
    pub to: String,
    pub q: String,
}

pub struct MissingContext {
    pub label: &'static str,
    pub config_key: &'static str,
}

pub struct SessionView {
    pub id: String,
    pub session_id: String,
    pub context_label: String,
    pub last_activity: String,
    pub message_count: String,
    pub status: &'static str,
    /// CSS class for the status cell.
    pub status_class: &'static str,
}

pub struct PendingView {
    pub id: String,
    pub session_id: String,
    pub context_label: String,
    pub last_human_at: String,
}

pub struct TokenView {
    pub word: String,
    pub count: String,
}

impl DashboardTemplate {
    fn new(dashboard: Dashboard, offset: FixedOffset) -> Self {
        let filter = FilterView {
            office: dashboard.filter.unit_code(),
            bot: dashboard.filter.bot_code(),
            range: dashboard.filter.preset.code(),
            from: dashboard.filter.from.clone().unwrap_or_default(),
            to: dashboard.filter.to.clone().unwrap_or_default(),
            q: dashboard.filter.search.clone().unwrap_or_default(),
        };

        let window_label = format!(
            "{} to {}",
            format_timestamp(dashboard.window.start, offset),
            format_timestamp(dashboard.window.end, offset)
        );

        let sessions = dashboard
            .sessions
            .into_iter()
            .map(|row| SessionView {
                last_activity: format_timestamp(row.session.last_activity, offset),
                message_count: format_count(row.session.message_count),
                status: row.status.label(),
                status_class: status_class(row.status),
                id: row.session.id,
                session_id: row.session.session_id,
                context_label: row.session.context_label,
            })
            .collect();

        let pending = dashboard
            .pending
            .into_iter()
            .map(|session| PendingView {
                last_human_at: format_timestamp(session.last_human_at, offset),
                id: session.id,
                session_id: session.session_id,
                context_label: session.context_label,
            })
            .collect();

        let tokens = dashboard
            .top_tokens
            .into_iter()
            .map(|token| TokenView {
                count: format_count(i64::try_from(token.count).unwrap_or(i64::MAX)),
                word: token.word,
            })
            .collect();

        Self {
            filter,
            window_label,
            total_sessions: format_count(dashboard.activity.total_sessions),
            total_messages: format_count(dashboard.activity.total_messages),
            median_latency: format_seconds(dashboard.latency.median_seconds),
            p95_latency: format_seconds(dashboard.latency.p95_seconds),
            sessions,
            pending,
            tokens,
            missing: dashboard
                .missing
                .iter()
                .map(|context| MissingContext {
                    label: context.label,
                    config_key: context.config_key,
                })
                .collect(),
            failed: dashboard
                .failed
                .iter()
                .map(|key| context_for(*key).label.to_string())
                .collect(),
        }
    }
}

fn status_class(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Overdue => "status-overdue",
        SessionStatus::Open => "status-open",
        SessionStatus::NeedsAttention => "status-needs-attention",
        SessionStatus::Closed => "status-closed",
    }
}

/// Render the dashboard page.
pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<DashboardTemplate> {
    let dashboard = build_dashboard(&state, params).await?;
    Ok(DashboardTemplate::new(
        dashboard,
        state.engine.settings().display_offset,
    ))
}

/// Get the dashboard aggregates as JSON.
pub async fn dashboard_api(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Dashboard>> {
    let dashboard = build_dashboard(&state, params).await?;
    Ok(Json(dashboard))
}

async fn build_dashboard(state: &AppState, params: FilterParams) -> Result<Dashboard> {
    let filter = Filter::from(params);
    Ok(state.engine.dashboard(&filter, Utc::now()).await?)
}
