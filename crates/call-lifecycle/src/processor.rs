//! Webhook event processing.
//!
//! `process_event` attributes a delivery to a tenant, finds the call it
//! concerns, and applies it in one transaction together with its audit
//! row. Ordering is lenient: an event names its target state and is
//! applied whatever the call's current status, so redeliveries and
//! out-of-order arrivals converge instead of erroring. The one stateful
//! guard is usage accounting, which never counts the same call twice.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use database::call::{self, CallAnalysisFields, CallEndFields};
use database::models::{Call, CallAnalytics, Order, Reservation, User, WebhookLog};
use database::{call_analytics, order, organization, reservation, room, user, webhook_log};

use crate::error::{LifecycleError, Result};
use crate::event::{CallAnalysis, CallPayload, LatencyMetrics, WebhookEvent};

/// Apply one verified webhook delivery.
///
/// Returns an error when the delivery cannot be attributed (no
/// organization id in metadata, no matching call) or when a handler
/// fails; every outcome, including those, leaves a `webhook_logs` row.
/// Unknown event names are logged as unprocessed and acknowledged.
pub async fn process_event(
    pool: &SqlitePool,
    event: &WebhookEvent,
    raw_payload: &str,
) -> Result<()> {
    let remote_call_id = event.call.call_id.clone().unwrap_or_default();

    let Some(organization_id) = event.call.organization_id().map(str::to_string) else {
        warn!("Webhook {} carries no organization id", event_name(event));
        audit_failure(
            pool,
            event,
            raw_payload,
            None,
            None,
            "no organization id in metadata",
        )
        .await;
        return Err(LifecycleError::MissingMetadata);
    };

    let found = {
        let mut conn = pool.acquire().await?;
        call::find_by_remote_id(&mut conn, &organization_id, &remote_call_id).await?
    };

    let Some(db_call) = found else {
        warn!(
            "Webhook {} for unknown call {} in organization {}",
            event_name(event),
            remote_call_id,
            organization_id
        );
        audit_failure(
            pool,
            event,
            raw_payload,
            None,
            Some(&organization_id),
            "call not found",
        )
        .await;
        return Err(LifecycleError::CallNotFound {
            call_id: remote_call_id,
        });
    };

    let outcome = match event.event.as_str() {
        "call_started" => handle_started(pool, &db_call, event, raw_payload).await,
        "call_ended" => handle_ended(pool, &db_call, event, raw_payload).await,
        "call_analyzed" => handle_analyzed(pool, &db_call, event, raw_payload).await,
        other => {
            warn!("Unknown webhook event type: {}", event_name(event));
            audit_failure(
                pool,
                event,
                raw_payload,
                Some(&db_call.id),
                Some(&organization_id),
                &format!("unknown event type: {}", other),
            )
            .await;
            return Ok(());
        }
    };

    if let Err(ref e) = outcome {
        audit_failure(
            pool,
            event,
            raw_payload,
            Some(&db_call.id),
            Some(&organization_id),
            &e.to_string(),
        )
        .await;
    }

    outcome
}

async fn handle_started(
    pool: &SqlitePool,
    db_call: &Call,
    event: &WebhookEvent,
    raw_payload: &str,
) -> Result<()> {
    let started_at_ms = event.call.start_timestamp.unwrap_or_else(now_ms);

    let mut tx = pool.begin().await?;
    call::mark_started(&mut tx, &db_call.id, started_at_ms).await?;
    webhook_log::insert_log(&mut tx, &processed_log(event, raw_payload, db_call)).await?;
    tx.commit().await?;

    info!("Call {} marked IN_PROGRESS", db_call.id);
    Ok(())
}

async fn handle_ended(
    pool: &SqlitePool,
    db_call: &Call,
    event: &WebhookEvent,
    raw_payload: &str,
) -> Result<()> {
    let payload = &event.call;
    let duration_ms = match (payload.start_timestamp, payload.end_timestamp) {
        (Some(start), Some(end)) => Some(end - start),
        _ => None,
    };
    let fields = CallEndFields {
        ended_at_ms: Some(payload.end_timestamp.unwrap_or_else(now_ms)),
        duration_ms,
        transcript: payload.transcript_text(),
        recording_url: payload.recording_url.clone(),
        public_log_url: payload.public_log_url.clone(),
        disconnection_reason: payload.disconnection_reason.clone(),
        llm_token_usage: payload.llm_token_count,
        call_cost_cents: payload.cost_cents(),
    };

    // A redelivered end event overwrites the call fields again but must
    // not count the same minutes twice.
    let already_counted = db_call.status == "ENDED" || db_call.status == "ANALYZED";

    let mut tx = pool.begin().await?;
    call::mark_ended(&mut tx, &db_call.id, &fields).await?;
    if let Some(duration_ms) = duration_ms {
        if duration_ms > 0 && !already_counted {
            let minutes = (duration_ms + 59_999) / 60_000;
            organization::add_call_minutes(&mut tx, &db_call.organization_id, minutes).await?;
            info!(
                "Added {} minutes to organization {} usage",
                minutes, db_call.organization_id
            );
        }
    }
    webhook_log::insert_log(&mut tx, &processed_log(event, raw_payload, db_call)).await?;
    tx.commit().await?;

    info!("Call {} marked ENDED", db_call.id);
    Ok(())
}

async fn handle_analyzed(
    pool: &SqlitePool,
    db_call: &Call,
    event: &WebhookEvent,
    raw_payload: &str,
) -> Result<()> {
    let payload = &event.call;
    let analysis = payload.call_analysis.clone().unwrap_or_default();

    let fields = CallAnalysisFields {
        transcript: payload.transcript_text(),
        recording_url: payload.recording_url.clone(),
        public_log_url: payload.public_log_url.clone(),
        disconnection_reason: payload.disconnection_reason.clone(),
        llm_token_usage: payload.llm_token_count,
        call_cost_cents: payload.cost_cents(),
    };
    let analytics = build_analytics(&db_call.id, &analysis, payload.latency.as_ref());

    // The initiating user decides which business record the analysis can
    // produce. Resolve the user and any room type before opening the
    // transaction.
    let initiator = user::get_user(pool, &db_call.initiated_by).await?;
    let derived = plan_derivation(pool, db_call, &initiator, payload, &analysis).await?;

    let mut tx = pool.begin().await?;
    call::mark_analyzed(&mut tx, &db_call.id, &fields).await?;
    call_analytics::upsert_analytics(&mut tx, &analytics).await?;
    match derived {
        Some(Derived::Order(new_order)) => {
            if !order::exists_for_call(&mut tx, &db_call.id).await? {
                order::create_order(&mut tx, &new_order).await?;
                info!("Created order {} from call {}", new_order.id, db_call.id);
            }
        }
        Some(Derived::Reservation(new_reservation)) => {
            if !reservation::exists_for_call(&mut tx, &db_call.id).await? {
                reservation::create_reservation(&mut tx, &new_reservation).await?;
                info!(
                    "Created reservation {} from call {}",
                    new_reservation.id, db_call.id
                );
            }
        }
        None => {}
    }
    webhook_log::insert_log(&mut tx, &processed_log(event, raw_payload, db_call)).await?;
    tx.commit().await?;

    info!("Call {} marked ANALYZED", db_call.id);
    Ok(())
}

/// A business record the analysis asked for.
enum Derived {
    Order(Order),
    Reservation(Reservation),
}

/// Build the order or reservation this analysis should produce, if any.
/// Restaurant customers get orders, hotel customers get reservations;
/// other users derive nothing.
async fn plan_derivation(
    pool: &SqlitePool,
    db_call: &Call,
    initiator: &User,
    payload: &CallPayload,
    analysis: &CallAnalysis,
) -> Result<Option<Derived>> {
    let Some(custom) = analysis.custom_analysis_data.as_ref() else {
        return Ok(None);
    };

    let phone = payload
        .from_number
        .clone()
        .or_else(|| db_call.from_number.clone());

    match initiator.customer_type.as_deref() {
        Some("RESTAURANT") => {
            let Some(data) = custom.get("order") else {
                return Ok(None);
            };
            let items = string_field(data, "items")
                .or_else(|| payload.transcript_text())
                .unwrap_or_else(|| "No items specified".to_string());

            Ok(Some(Derived::Order(Order {
                id: Uuid::new_v4().to_string(),
                customer_id: initiator.id.clone(),
                call_id: Some(db_call.id.clone()),
                customer_name: string_field(data, "customer_name")
                    .unwrap_or_else(|| "Unknown".to_string()),
                customer_phone: phone,
                items,
                total_amount: number_field(data, "total_amount"),
                delivery_address: string_field(data, "delivery_address"),
                notes: string_field(data, "notes"),
                status: "PENDING".to_string(),
                created_at: String::new(),
            })))
        }
        Some("HOTEL") => {
            let Some(data) = custom.get("reservation") else {
                return Ok(None);
            };
            let today = Utc::now().format("%Y-%m-%d").to_string();
            let room_type_id = match string_field(data, "room_type") {
                Some(name) => room::list_active_room_types(pool, &initiator.id)
                    .await?
                    .into_iter()
                    .find(|rt| rt.name.eq_ignore_ascii_case(&name))
                    .map(|rt| rt.id),
                None => None,
            };

            Ok(Some(Derived::Reservation(Reservation {
                id: Uuid::new_v4().to_string(),
                customer_id: initiator.id.clone(),
                call_id: Some(db_call.id.clone()),
                room_type_id,
                guest_name: string_field(data, "guest_name")
                    .unwrap_or_else(|| "Unknown".to_string()),
                guest_phone: phone,
                guest_email: string_field(data, "guest_email"),
                check_in: string_field(data, "check_in").unwrap_or_else(|| today.clone()),
                check_out: string_field(data, "check_out").unwrap_or_else(|| today.clone()),
                number_of_guests: data
                    .get("number_of_guests")
                    .and_then(Value::as_i64)
                    .filter(|n| *n > 0)
                    .unwrap_or(1),
                special_requests: string_field(data, "special_requests"),
                status: "PENDING".to_string(),
                created_at: String::new(),
            })))
        }
        _ => Ok(None),
    }
}

fn build_analytics(
    call_id: &str,
    analysis: &CallAnalysis,
    latency: Option<&LatencyMetrics>,
) -> CallAnalytics {
    let latency = latency.copied().unwrap_or_default();
    let e2e = latency.e2e_latency.unwrap_or_default();
    let llm = latency.llm_latency.unwrap_or_default();
    let asr = latency.asr_latency.unwrap_or_default();
    let tts = latency.tts_latency.unwrap_or_default();
    let kb = latency.knowledge_base_latency.unwrap_or_default();
    let rtt = latency.llm_websocket_network_rtt_latency.unwrap_or_default();

    CallAnalytics {
        call_id: call_id.to_string(),
        summary: analysis.call_summary.clone(),
        sentiment: analysis.sentiment.clone(),
        success_evaluation: analysis.call_successful.map(|ok| ok.to_string()),
        custom_analysis: analysis.custom_analysis_data.as_ref().map(Value::to_string),
        e2e_p50: e2e.p50,
        e2e_p90: e2e.p90,
        e2e_p95: e2e.p95,
        e2e_p99: e2e.p99,
        llm_p50: llm.p50,
        llm_p90: llm.p90,
        llm_p95: llm.p95,
        llm_p99: llm.p99,
        asr_p50: asr.p50,
        asr_p90: asr.p90,
        asr_p95: asr.p95,
        asr_p99: asr.p99,
        tts_p50: tts.p50,
        tts_p90: tts.p90,
        tts_p95: tts.p95,
        tts_p99: tts.p99,
        kb_p50: kb.p50,
        kb_p90: kb.p90,
        kb_p95: kb.p95,
        kb_p99: kb.p99,
        network_rtt_p50: rtt.p50,
        network_rtt_p90: rtt.p90,
        network_rtt_p95: rtt.p95,
        network_rtt_p99: rtt.p99,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

/// Record a failed or unrecognized delivery. Best-effort: a failure to
/// write the audit row is logged, not propagated, so it cannot mask the
/// error that caused it.
async fn audit_failure(
    pool: &SqlitePool,
    event: &WebhookEvent,
    raw_payload: &str,
    call_id: Option<&str>,
    organization_id: Option<&str>,
    error: &str,
) {
    let log = WebhookLog {
        id: Uuid::new_v4().to_string(),
        call_id: call_id.map(str::to_string),
        organization_id: organization_id.map(str::to_string),
        event_type: event_name(event).to_string(),
        payload: raw_payload.to_string(),
        processed: false,
        error: Some(error.to_string()),
        created_at: String::new(),
    };

    match pool.acquire().await {
        Ok(mut conn) => {
            if let Err(e) = webhook_log::insert_log(&mut conn, &log).await {
                warn!("Failed to record webhook audit row: {}", e);
            }
        }
        Err(e) => warn!("Failed to record webhook audit row: {}", e),
    }
}

fn processed_log(event: &WebhookEvent, raw_payload: &str, db_call: &Call) -> WebhookLog {
    WebhookLog {
        id: Uuid::new_v4().to_string(),
        call_id: Some(db_call.id.clone()),
        organization_id: Some(db_call.organization_id.clone()),
        event_type: event_name(event).to_string(),
        payload: raw_payload.to_string(),
        processed: true,
        error: None,
        created_at: String::new(),
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numeric analysis fields arrive as JSON numbers or numeric strings.
fn number_field(data: &Value, key: &str) -> Option<f64> {
    match data.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn event_name(event: &WebhookEvent) -> &str {
    if event.event.is_empty() {
        "unknown"
    } else {
        &event.event
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
