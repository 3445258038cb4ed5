//! Webhook audit log.
//!
//! One row per received delivery, written whether or not processing
//! succeeded. The table is append-only.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::Result;
use crate::models::WebhookLog;

/// Insert an audit row.
///
/// Takes a connection so it can join the processor's transaction; failure
/// paths acquire their own connection from the pool.
pub async fn insert_log(conn: &mut SqliteConnection, log: &WebhookLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO webhook_logs (id, call_id, organization_id, event_type, payload, processed, error)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(&log.call_id)
    .bind(&log.organization_id)
    .bind(&log.event_type)
    .bind(&log.payload)
    .bind(log.processed)
    .bind(&log.error)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// List recent deliveries for an organization, newest first.
pub async fn list_logs(
    pool: &SqlitePool,
    organization_id: &str,
    limit: i64,
) -> Result<Vec<WebhookLog>> {
    let logs = sqlx::query_as::<_, WebhookLog>(
        r#"
        SELECT id, call_id, organization_id, event_type, payload, processed, error, created_at
        FROM webhook_logs
        WHERE organization_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(organization_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// List every delivery recorded for a call, oldest first.
pub async fn list_logs_for_call(pool: &SqlitePool, call_id: &str) -> Result<Vec<WebhookLog>> {
    let logs = sqlx::query_as::<_, WebhookLog>(
        r#"
        SELECT id, call_id, organization_id, event_type, payload, processed, error, created_at
        FROM webhook_logs
        WHERE call_id = ?
        ORDER BY created_at, id
        "#,
    )
    .bind(call_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_call_chain, test_db};

    #[tokio::test]
    async fn test_failure_rows_are_kept() {
        let db = test_db().await;
        let (org_id, _, _, call_id) = seed_call_chain(&db).await;

        let mut conn = db.pool().acquire().await.unwrap();
        insert_log(
            &mut conn,
            &WebhookLog {
                id: "log-1".to_string(),
                call_id: Some(call_id.clone()),
                organization_id: Some(org_id.clone()),
                event_type: "call_ended".to_string(),
                payload: "{}".to_string(),
                processed: false,
                error: Some("boom".to_string()),
                created_at: String::new(),
            },
        )
        .await
        .unwrap();

        let logs = list_logs(db.pool(), &org_id, 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].processed);
        assert_eq!(logs[0].error.as_deref(), Some("boom"));
    }
}
