//! Session listing.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use monitor_core::{Filter, FilterParams, SessionListItem};
use serde::Serialize;

use crate::display::format_timestamp;
use crate::error::Result;
use crate::state::AppState;

/// A listed session with its display timestamp.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    #[serde(flatten)]
    pub item: SessionListItem,
    pub last_activity_label: String,
}

#[derive(Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionEntry>,
}

/// List sessions for the given filters as JSON.
pub async fn sessions_api(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<SessionsResponse>> {
    let filter = Filter::from(params);
    let offset = state.engine.settings().display_offset;

    let sessions = state
        .engine
        .session_list(&filter, Utc::now())
        .await?
        .into_iter()
        .map(|item| SessionEntry {
            last_activity_label: format_timestamp(item.last_activity, offset),
            item,
        })
        .collect();

    Ok(Json(SessionsResponse { sessions }))
}
