//! Post-call analytics, one row per call.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::Result;
use crate::models::CallAnalytics;

/// Insert or overwrite the analytics row for a call.
///
/// Keyed by call id, so redelivered analysis events converge on a single
/// row instead of accumulating duplicates.
pub async fn upsert_analytics(conn: &mut SqliteConnection, analytics: &CallAnalytics) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO call_analytics (
            call_id, summary, sentiment, success_evaluation, custom_analysis,
            e2e_p50, e2e_p90, e2e_p95, e2e_p99,
            llm_p50, llm_p90, llm_p95, llm_p99,
            asr_p50, asr_p90, asr_p95, asr_p99,
            tts_p50, tts_p90, tts_p95, tts_p99,
            kb_p50, kb_p90, kb_p95, kb_p99,
            network_rtt_p50, network_rtt_p90, network_rtt_p95, network_rtt_p99
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(call_id) DO UPDATE SET
            summary = excluded.summary,
            sentiment = excluded.sentiment,
            success_evaluation = excluded.success_evaluation,
            custom_analysis = excluded.custom_analysis,
            e2e_p50 = excluded.e2e_p50,
            e2e_p90 = excluded.e2e_p90,
            e2e_p95 = excluded.e2e_p95,
            e2e_p99 = excluded.e2e_p99,
            llm_p50 = excluded.llm_p50,
            llm_p90 = excluded.llm_p90,
            llm_p95 = excluded.llm_p95,
            llm_p99 = excluded.llm_p99,
            asr_p50 = excluded.asr_p50,
            asr_p90 = excluded.asr_p90,
            asr_p95 = excluded.asr_p95,
            asr_p99 = excluded.asr_p99,
            tts_p50 = excluded.tts_p50,
            tts_p90 = excluded.tts_p90,
            tts_p95 = excluded.tts_p95,
            tts_p99 = excluded.tts_p99,
            kb_p50 = excluded.kb_p50,
            kb_p90 = excluded.kb_p90,
            kb_p95 = excluded.kb_p95,
            kb_p99 = excluded.kb_p99,
            network_rtt_p50 = excluded.network_rtt_p50,
            network_rtt_p90 = excluded.network_rtt_p90,
            network_rtt_p95 = excluded.network_rtt_p95,
            network_rtt_p99 = excluded.network_rtt_p99,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&analytics.call_id)
    .bind(&analytics.summary)
    .bind(&analytics.sentiment)
    .bind(&analytics.success_evaluation)
    .bind(&analytics.custom_analysis)
    .bind(analytics.e2e_p50)
    .bind(analytics.e2e_p90)
    .bind(analytics.e2e_p95)
    .bind(analytics.e2e_p99)
    .bind(analytics.llm_p50)
    .bind(analytics.llm_p90)
    .bind(analytics.llm_p95)
    .bind(analytics.llm_p99)
    .bind(analytics.asr_p50)
    .bind(analytics.asr_p90)
    .bind(analytics.asr_p95)
    .bind(analytics.asr_p99)
    .bind(analytics.tts_p50)
    .bind(analytics.tts_p90)
    .bind(analytics.tts_p95)
    .bind(analytics.tts_p99)
    .bind(analytics.kb_p50)
    .bind(analytics.kb_p90)
    .bind(analytics.kb_p95)
    .bind(analytics.kb_p99)
    .bind(analytics.network_rtt_p50)
    .bind(analytics.network_rtt_p90)
    .bind(analytics.network_rtt_p95)
    .bind(analytics.network_rtt_p99)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get the analytics row for a call, if analysis has arrived.
pub async fn get_analytics(pool: &SqlitePool, call_id: &str) -> Result<Option<CallAnalytics>> {
    let row = sqlx::query_as::<_, CallAnalytics>(
        r#"
        SELECT * FROM call_analytics WHERE call_id = ?
        "#,
    )
    .bind(call_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_call_chain, test_db};

    #[tokio::test]
    async fn test_upsert_converges_on_one_row() {
        let db = test_db().await;
        let (_, _, _, call_id) = seed_call_chain(&db).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let mut analytics = CallAnalytics {
            call_id: call_id.clone(),
            summary: Some("Caller booked a room".to_string()),
            sentiment: Some("Positive".to_string()),
            success_evaluation: Some("true".to_string()),
            custom_analysis: None,
            e2e_p50: Some(820.0),
            e2e_p90: None,
            e2e_p95: None,
            e2e_p99: None,
            llm_p50: None,
            llm_p90: None,
            llm_p95: None,
            llm_p99: None,
            asr_p50: None,
            asr_p90: None,
            asr_p95: None,
            asr_p99: None,
            tts_p50: None,
            tts_p90: None,
            tts_p95: None,
            tts_p99: None,
            kb_p50: None,
            kb_p90: None,
            kb_p95: None,
            kb_p99: None,
            network_rtt_p50: None,
            network_rtt_p90: None,
            network_rtt_p95: None,
            network_rtt_p99: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        upsert_analytics(&mut conn, &analytics).await.unwrap();

        analytics.summary = Some("Caller booked two rooms".to_string());
        analytics.e2e_p50 = Some(790.5);
        upsert_analytics(&mut conn, &analytics).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM call_analytics")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let row = get_analytics(db.pool(), &call_id).await.unwrap().unwrap();
        assert_eq!(row.summary.as_deref(), Some("Caller booked two rooms"));
        assert_eq!(row.e2e_p50, Some(790.5));
    }
}
