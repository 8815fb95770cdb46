//! Human-to-AI reply gaps.

use sqlx::PgPool;

use crate::models::TimeWindow;

/// Seconds between each `ai` message and its immediate predecessor, when
/// that predecessor is a `human` message of the same session.
///
/// Pairing is strictly by adjacency: a human message followed by anything
/// other than an ai message yields no sample, even if an ai reply comes
/// later. Zero and negative gaps are dropped.
pub async fn reply_gaps(pool: &PgPool, window: &TimeWindow) -> sqlx::Result<Vec<f64>> {
    sqlx::query_scalar::<_, f64>(
        r#"
        WITH paired AS (
            SELECT
                created_at,
                message->>'type' AS message_type,
                LAG(created_at) OVER w AS prev_created_at,
                LAG(message->>'type') OVER w AS prev_type
            FROM n8n_chat_histories
            WHERE created_at >= $1 AND created_at < $2
            WINDOW w AS (PARTITION BY session_id ORDER BY created_at, id)
        )
        SELECT
            EXTRACT(EPOCH FROM (created_at - prev_created_at))::float8 AS gap_seconds
        FROM paired
        WHERE message_type = 'ai'
          AND prev_type = 'human'
          AND prev_created_at IS NOT NULL
          AND created_at > prev_created_at
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await
}
