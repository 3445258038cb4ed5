//! Webhook audit log route, admin-only.

use axum::extract::{Query, State};
use axum::Json;

use database::models::WebhookLog;
use database::webhook_log;

use crate::error::Result;
use crate::identity::Identity;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// List the organization's webhook logs, newest first.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WebhookLog>>> {
    identity.require_admin()?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let logs = webhook_log::list_logs(state.db.pool(), &identity.organization_id, limit).await?;
    Ok(Json(logs))
}
