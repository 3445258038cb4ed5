//! Operational debug route: the platform's view of recent calls.
//!
//! Useful when local call rows and the platform disagree. The response
//! names the credential in masked form so an operator can tell which key
//! the lookup ran under.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::credentials::platform_client_for;
use crate::error::Result;
use crate::identity::Identity;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

pub async fn remote_calls(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let client =
        platform_client_for(state.db.pool(), &state.config, &identity.organization_id).await?;
    let calls = client.list_calls(limit).await?;

    Ok(Json(json!({
        "credential": client.credential_preview(),
        "count": calls.len(),
        "calls": calls,
    })))
}
