//! Activity totals.

use sqlx::PgPool;

use crate::models::{ActivityCounts, TimeWindow};

/// Count distinct sessions and messages created inside the window.
pub async fn count_activity(pool: &PgPool, window: &TimeWindow) -> sqlx::Result<ActivityCounts> {
    sqlx::query_as::<_, ActivityCounts>(
        r#"
        SELECT
            COUNT(DISTINCT session_id) AS session_count,
            COUNT(*) AS message_count
        FROM n8n_chat_histories
        WHERE created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await
}
