//! Call CRUD and lifecycle updates.
//!
//! Lifecycle updates take `&mut SqliteConnection` so the webhook processor
//! can compose them with audit writes in a single transaction. Plain reads
//! and creates take the pool.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::Call;

/// Column values applied when a call ends.
#[derive(Debug, Clone, Default)]
pub struct CallEndFields {
    pub ended_at_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    pub transcript: Option<String>,
    pub recording_url: Option<String>,
    pub public_log_url: Option<String>,
    pub disconnection_reason: Option<String>,
    pub llm_token_usage: Option<i64>,
    pub call_cost_cents: Option<i64>,
}

/// Column values re-applied when the post-call analysis arrives. The
/// platform resends call fields with the analysis; they overwrite whatever
/// the end event stored.
#[derive(Debug, Clone, Default)]
pub struct CallAnalysisFields {
    pub transcript: Option<String>,
    pub recording_url: Option<String>,
    pub public_log_url: Option<String>,
    pub disconnection_reason: Option<String>,
    pub llm_token_usage: Option<i64>,
    pub call_cost_cents: Option<i64>,
}

/// Create a new call.
pub async fn create_call(pool: &SqlitePool, call: &Call) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO calls (
            id, organization_id, bot_id, initiated_by, remote_call_id,
            from_number, to_number, direction, status, started_at_ms
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&call.id)
    .bind(&call.organization_id)
    .bind(&call.bot_id)
    .bind(&call.initiated_by)
    .bind(&call.remote_call_id)
    .bind(&call.from_number)
    .bind(&call.to_number)
    .bind(&call.direction)
    .bind(&call.status)
    .bind(call.started_at_ms)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "Call", &call.remote_call_id))?;

    Ok(())
}

/// Get a call by ID within an organization.
pub async fn get_call(pool: &SqlitePool, organization_id: &str, id: &str) -> Result<Call> {
    sqlx::query_as::<_, Call>(
        r#"
        SELECT id, organization_id, bot_id, initiated_by, remote_call_id,
               from_number, to_number, direction, status, started_at_ms,
               ended_at_ms, duration_ms, transcript, recording_url,
               public_log_url, disconnection_reason, llm_token_usage,
               call_cost_cents, created_at
        FROM calls
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Call",
        id: id.to_string(),
    })
}

/// Find a call by remote call id within an organization.
///
/// Webhook processing resolves calls this way; both the event's claimed
/// organization and the call row must agree.
pub async fn find_by_remote_id(
    conn: &mut SqliteConnection,
    organization_id: &str,
    remote_call_id: &str,
) -> Result<Option<Call>> {
    let call = sqlx::query_as::<_, Call>(
        r#"
        SELECT id, organization_id, bot_id, initiated_by, remote_call_id,
               from_number, to_number, direction, status, started_at_ms,
               ended_at_ms, duration_ms, transcript, recording_url,
               public_log_url, disconnection_reason, llm_token_usage,
               call_cost_cents, created_at
        FROM calls
        WHERE organization_id = ? AND remote_call_id = ?
        "#,
    )
    .bind(organization_id)
    .bind(remote_call_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(call)
}

/// Find a call by remote call id alone. Remote ids are globally unique;
/// mid-call tool requests carry no tenant.
pub async fn find_by_remote_id_any_org(
    pool: &SqlitePool,
    remote_call_id: &str,
) -> Result<Option<Call>> {
    let call = sqlx::query_as::<_, Call>(
        r#"
        SELECT id, organization_id, bot_id, initiated_by, remote_call_id,
               from_number, to_number, direction, status, started_at_ms,
               ended_at_ms, duration_ms, transcript, recording_url,
               public_log_url, disconnection_reason, llm_token_usage,
               call_cost_cents, created_at
        FROM calls
        WHERE remote_call_id = ?
        "#,
    )
    .bind(remote_call_id)
    .fetch_optional(pool)
    .await?;

    Ok(call)
}

/// Mark a call in progress.
pub async fn mark_started(
    conn: &mut SqliteConnection,
    id: &str,
    started_at_ms: i64,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = 'IN_PROGRESS', started_at_ms = ?
        WHERE id = ?
        "#,
    )
    .bind(started_at_ms)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Call",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Mark a call ended, overwriting end-of-call fields unconditionally.
pub async fn mark_ended(
    conn: &mut SqliteConnection,
    id: &str,
    fields: &CallEndFields,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = 'ENDED', ended_at_ms = ?, duration_ms = ?, transcript = ?,
            recording_url = ?, public_log_url = ?, disconnection_reason = ?,
            llm_token_usage = ?, call_cost_cents = ?
        WHERE id = ?
        "#,
    )
    .bind(fields.ended_at_ms)
    .bind(fields.duration_ms)
    .bind(&fields.transcript)
    .bind(&fields.recording_url)
    .bind(&fields.public_log_url)
    .bind(&fields.disconnection_reason)
    .bind(fields.llm_token_usage)
    .bind(fields.call_cost_cents)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Call",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Mark a call analyzed, re-applying the call fields delivered with the
/// analysis.
pub async fn mark_analyzed(
    conn: &mut SqliteConnection,
    id: &str,
    fields: &CallAnalysisFields,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = 'ANALYZED', transcript = ?, recording_url = ?,
            public_log_url = ?, disconnection_reason = ?, llm_token_usage = ?,
            call_cost_cents = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.transcript)
    .bind(&fields.recording_url)
    .bind(&fields.public_log_url)
    .bind(&fields.disconnection_reason)
    .bind(fields.llm_token_usage)
    .bind(fields.call_cost_cents)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Call",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List calls of an organization, newest first.
pub async fn list_calls(pool: &SqlitePool, organization_id: &str, limit: i64) -> Result<Vec<Call>> {
    let calls = sqlx::query_as::<_, Call>(
        r#"
        SELECT id, organization_id, bot_id, initiated_by, remote_call_id,
               from_number, to_number, direction, status, started_at_ms,
               ended_at_ms, duration_ms, transcript, recording_url,
               public_log_url, disconnection_reason, llm_token_usage,
               call_cost_cents, created_at
        FROM calls
        WHERE organization_id = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(organization_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(calls)
}

/// List calls a user initiated, newest first.
pub async fn list_calls_for_user(
    pool: &SqlitePool,
    organization_id: &str,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Call>> {
    let calls = sqlx::query_as::<_, Call>(
        r#"
        SELECT id, organization_id, bot_id, initiated_by, remote_call_id,
               from_number, to_number, direction, status, started_at_ms,
               ended_at_ms, duration_ms, transcript, recording_url,
               public_log_url, disconnection_reason, llm_token_usage,
               call_cost_cents, created_at
        FROM calls
        WHERE organization_id = ? AND initiated_by = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(calls)
}
