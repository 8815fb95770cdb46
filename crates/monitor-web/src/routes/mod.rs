//! Route handlers for the monitor web interface.

pub mod chat;
pub mod dashboard;
pub mod health;
pub mod sessions;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/dashboard", get(dashboard::dashboard_api))
        .route("/api/sessions", get(sessions::sessions_api))
        .route("/api/chat", get(chat::chat_api))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use monitor_core::{AggregationEngine, EngineSettings};
    use tower::ServiceExt;
    use transcript_store::{ContextRegistry, StaticEndpoints, TranscriptSource};

    use super::*;

    fn app() -> Router {
        let registry: Arc<dyn TranscriptSource> =
            Arc::new(ContextRegistry::new(StaticEndpoints::new()));
        let engine = AggregationEngine::new(registry, EngineSettings::default());
        router().with_state(AppState::new(engine))
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            r#"{"status":"ok","configuredContexts":0,"missingContexts":4}"#
        );
    }

    #[tokio::test]
    async fn test_sessions_without_contexts_is_empty() {
        let (status, body) = get_body("/api/sessions?office=AMG&range=bogus&page=x").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["sessions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_chat_requires_sid() {
        let (status, _) = get_body("/api/chat").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_body("/api/chat?sid=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_with_malformed_sid_is_empty() {
        let (status, body) = get_body("/api/chat?sid=not-a-session").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["messages"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_dashboard_api_reports_missing_contexts() {
        let (status, body) = get_body("/api/dashboard?range=today").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["missing"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["activity"]["totalSessions"], 0);
        assert!(json["latency"]["p95Seconds"].is_null());
    }

    #[tokio::test]
    async fn test_dashboard_page_renders() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("AMG Sales: DB_URL_AMG_SALES is not set"));
        assert!(body.contains("LMP Customer: DB_URL_LMP_CUSTOMER is not set"));
        assert!(body.contains("—"));
    }
}
