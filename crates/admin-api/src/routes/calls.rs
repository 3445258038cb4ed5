//! Call history routes.
//!
//! Admins see the whole organization; customers only see calls they
//! initiated. The detail view joins the analytics row when one exists.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use database::models::Call;
use database::{call, call_analytics};

use crate::error::Result;
use crate::identity::Identity;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// Call detail with its analytics row, when analysis has arrived.
#[derive(Serialize)]
pub struct CallDetail {
    #[serde(flatten)]
    pub call: Call,
    pub analytics: Option<database::models::CallAnalytics>,
}

/// List calls, newest first.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Call>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let pool = state.db.pool();

    let calls = if identity.is_admin() {
        call::list_calls(pool, &identity.organization_id, limit).await?
    } else {
        call::list_calls_for_user(pool, &identity.organization_id, &identity.user_id, limit)
            .await?
    };

    Ok(Json(calls))
}

/// Fetch one call with its analytics.
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    Path(call_id): Path<String>,
) -> Result<Json<CallDetail>> {
    let pool = state.db.pool();
    let found = call::get_call(pool, &identity.organization_id, &call_id).await?;

    if !identity.is_admin() && found.initiated_by != identity.user_id {
        return Err(crate::error::ApiError::NotFound(format!(
            "Call not found: {call_id}"
        )));
    }

    let analytics = call_analytics::get_analytics(pool, &found.id).await?;
    Ok(Json(CallDetail {
        call: found,
        analytics,
    }))
}
