//! Liveness probe with a context summary.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub configured_contexts: usize,
    pub missing_contexts: usize,
}

/// Always `ok` while the process serves requests; context counts reflect
/// the endpoints resolved right now, not whether their stores are reachable.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let (configured, missing) = state.engine.context_overview();
    Json(Health {
        status: "ok",
        configured_contexts: configured.len(),
        missing_contexts: missing.len(),
    })
}
