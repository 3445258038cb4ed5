//! Platform webhook routes.
//!
//! Two endpoints the voice platform calls directly: call lifecycle events
//! (signature-authenticated) and mid-call tool invocations. Neither uses
//! identity headers; lifecycle deliveries prove themselves by HMAC and
//! tool invocations are attributed through the call they reference.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use call_lifecycle::{process_event, verify_signature, LifecycleError, WebhookEvent};
use call_tools::{DispatchOutcome, ToolCallRequest};

use crate::credentials;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Header carrying the hex HMAC-SHA256 signature of the raw body.
const SIGNATURE_HEADER: &str = "x-voiceai-signature";

/// `POST /webhooks/voiceai` — call lifecycle events.
///
/// The signature is verified over the raw bytes before the payload is
/// trusted. The body is pre-parsed only to find the tenant whose webhook
/// secret override applies; that parse is not trusted until the signature
/// checks out against the resolved secret.
pub async fn voiceai(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let pool = state.db.pool();
    let event: Option<WebhookEvent> = serde_json::from_slice(&body).ok();
    let claimed_org = event.as_ref().and_then(|e| e.call.organization_id());

    let Some(secret) = credentials::webhook_secret_for(pool, &state.config, claimed_org).await
    else {
        return Err(ApiError::Internal(
            "webhook secret is not configured".to_string(),
        ));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&body, signature, &secret) {
        warn!("Rejected webhook with invalid signature");
        return Err(ApiError::Unauthorized("invalid signature".to_string()));
    }

    let Some(event) = event else {
        return Err(ApiError::Validation(
            "webhook body is not valid JSON".to_string(),
        ));
    };

    let raw_payload = String::from_utf8_lossy(&body);
    match process_event(pool, &event, &raw_payload).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(LifecycleError::MissingMetadata) => Err(ApiError::Validation(
            "webhook payload has no organization id in metadata".to_string(),
        )),
        Err(LifecycleError::CallNotFound { call_id }) => Err(ApiError::NotFound(format!(
            "no call found for remote call id {call_id}"
        ))),
        Err(LifecycleError::Database(e)) => Err(ApiError::Internal(e.to_string())),
    }
}

/// `POST /webhooks/tool-call` — a tool invocation from a live call.
///
/// Always answers 200 with a result the agent can speak, except when the
/// referenced call is unknown and cannot be recovered from the platform.
pub async fn tool_call(
    State(state): State<AppState>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<Value>> {
    let recovery = credentials::recovery_client(&state.config);
    let outcome = state
        .dispatcher
        .dispatch(state.db.pool(), recovery.as_ref(), &request)
        .await?;

    match outcome {
        DispatchOutcome::Completed {
            result,
            tool_call_id,
        } => Ok(Json(json!({
            "result": result,
            "tool_call_id": tool_call_id,
        }))),
        DispatchOutcome::CallNotFound => {
            Err(ApiError::NotFound("call not found".to_string()))
        }
    }
}
