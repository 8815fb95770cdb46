//! Messages of a single session.

use axum::extract::{Query, State};
use axum::Json;
use monitor_core::MessageView;
use serde::{Deserialize, Serialize};

use crate::display::format_timestamp;
use crate::error::{Result, WebError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatParams {
    /// Composite `{unit}:{bot}:{session}` id.
    pub sid: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntry {
    #[serde(flatten)]
    pub message: MessageView,
    pub created_at_label: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub messages: Vec<MessageEntry>,
}

/// Return a session's messages in chronological order.
pub async fn chat_api(
    State(state): State<AppState>,
    Query(params): Query<ChatParams>,
) -> Result<Json<ChatResponse>> {
    let sid = params
        .sid
        .filter(|sid| !sid.trim().is_empty())
        .ok_or(WebError::BadRequest("sid is required"))?;

    let offset = state.engine.settings().display_offset;
    let messages = state
        .engine
        .session_messages(&sid)
        .await?
        .into_iter()
        .map(|message| MessageEntry {
            created_at_label: format_timestamp(message.created_at, offset),
            message,
        })
        .collect();

    Ok(Json(ChatResponse { messages }))
}
