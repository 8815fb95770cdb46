//! Raw message reads.

use sqlx::PgPool;

use crate::models::{MessageRow, TimeWindow};

/// Contents of up to `cap` human messages inside the window.
pub async fn human_contents(
    pool: &PgPool,
    window: &TimeWindow,
    cap: i64,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT message->>'content' AS content
        FROM n8n_chat_histories
        WHERE created_at >= $1 AND created_at < $2
          AND message->>'type' = 'human'
          AND message->>'content' IS NOT NULL
        ORDER BY created_at, id
        LIMIT $3
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .bind(cap)
    .fetch_all(pool)
    .await
}

/// All messages of one session in chronological order, capped at `limit`.
pub async fn session_messages(
    pool: &PgPool,
    session_id: &str,
    limit: i64,
) -> sqlx::Result<Vec<MessageRow>> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT
            id::bigint AS id,
            session_id,
            message->>'type' AS message_type,
            message->>'content' AS content,
            created_at
        FROM n8n_chat_histories
        WHERE session_id = $1
        ORDER BY created_at ASC, id ASC
        LIMIT $2
        "#,
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
