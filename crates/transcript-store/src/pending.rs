//! Sessions awaiting a reply.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{PendingHead, TimeWindow};

/// Sessions whose latest in-window message is human and older than `cutoff`.
///
/// Sessions ending with an `ai` (or any other) message are never returned.
pub async fn pending_sessions(
    pool: &PgPool,
    window: &TimeWindow,
    cutoff: DateTime<Utc>,
    limit: i64,
) -> sqlx::Result<Vec<PendingHead>> {
    sqlx::query_as::<_, PendingHead>(
        r#"
        WITH ranked AS (
            SELECT
                session_id,
                message->>'type' AS message_type,
                created_at,
                ROW_NUMBER() OVER (
                    PARTITION BY session_id
                    ORDER BY created_at DESC, id DESC
                ) AS rn
            FROM n8n_chat_histories
            WHERE created_at >= $1 AND created_at < $2
        )
        SELECT
            session_id,
            created_at AS last_human_at
        FROM ranked
        WHERE rn = 1
          AND message_type = 'human'
          AND created_at < $3
        ORDER BY last_human_at DESC, session_id
        LIMIT $4
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .bind(cutoff)
    .bind(limit)
    .fetch_all(pool)
    .await
}
