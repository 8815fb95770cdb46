//! Per-session aggregates.

use sqlx::PgPool;

use crate::models::{SessionActivity, SessionHead, TimeWindow};

/// The `limit` most recently active sessions with per-role message counts.
pub async fn recent_sessions(
    pool: &PgPool,
    window: &TimeWindow,
    limit: i64,
) -> sqlx::Result<Vec<SessionActivity>> {
    sqlx::query_as::<_, SessionActivity>(
        r#"
        SELECT
            session_id,
            MAX(created_at) AS last_activity,
            COUNT(*) AS message_count,
            COUNT(*) FILTER (WHERE message->>'type' = 'human') AS human_count,
            COUNT(*) FILTER (WHERE message->>'type' = 'ai') AS ai_count
        FROM n8n_chat_histories
        WHERE created_at >= $1 AND created_at < $2
        GROUP BY session_id
        ORDER BY last_activity DESC, session_id
        LIMIT $3
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// One page of sessions ordered by last activity, each with its latest message.
pub async fn session_heads(
    pool: &PgPool,
    window: &TimeWindow,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<SessionHead>> {
    sqlx::query_as::<_, SessionHead>(
        r#"
        WITH base AS (
            SELECT
                session_id,
                message->>'type' AS message_type,
                message->>'content' AS content,
                created_at,
                ROW_NUMBER() OVER (
                    PARTITION BY session_id
                    ORDER BY created_at DESC, id DESC
                ) AS rn
            FROM n8n_chat_histories
            WHERE created_at >= $1 AND created_at < $2
        ),
        aggregated AS (
            SELECT
                session_id,
                MAX(created_at) AS last_activity,
                COUNT(*) AS message_count
            FROM base
            GROUP BY session_id
        )
        SELECT
            aggregated.session_id,
            aggregated.last_activity,
            aggregated.message_count,
            base.message_type AS last_type,
            base.content AS last_content
        FROM aggregated
        JOIN base ON base.session_id = aggregated.session_id AND base.rn = 1
        ORDER BY aggregated.last_activity DESC, aggregated.session_id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
