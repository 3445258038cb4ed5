//! Phone number routes.
//!
//! Numbers exist on the platform first. Purchasing or importing goes to
//! the platform, and only a success creates the local row; binding
//! changes patch the platform before the row. Releasing a number is
//! best-effort remote, unconditional local.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use database::models::PhoneNumber;
use database::{bot, phone_number, user};
use platform_client::types::{CreatePhoneNumberParams, ImportPhoneNumberParams};

use crate::credentials::platform_client_for;
use crate::error::{ApiError, Result};
use crate::identity::Identity;
use crate::state::AppState;

/// Query string of `POST /api/numbers`.
#[derive(serde::Deserialize)]
pub struct CreateAction {
    /// `purchase` (default) or `import`.
    pub action: Option<String>,
}

/// Request to purchase or import a number.
#[derive(serde::Deserialize)]
pub struct CreateNumberRequest {
    /// Preferred area code, purchase only.
    pub area_code: Option<String>,
    /// E.164 number to import, import only.
    pub number: Option<String>,
    /// SIP termination URI at the current carrier, import only.
    pub termination_uri: Option<String>,
    pub nickname: Option<String>,
    pub inbound_bot_id: Option<String>,
    pub outbound_bot_id: Option<String>,
}

/// Request to edit a number. Bindings are patched remotely first.
#[derive(serde::Deserialize)]
pub struct UpdateNumberRequest {
    pub nickname: Option<String>,
    pub inbound_bot_id: Option<String>,
    pub outbound_bot_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Request to assign the number to a customer.
#[derive(serde::Deserialize)]
pub struct AssignRequest {
    pub user_id: String,
}

/// List the organization's numbers.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<PhoneNumber>>> {
    let numbers =
        phone_number::list_phone_numbers(state.db.pool(), &identity.organization_id).await?;
    Ok(Json(numbers))
}

/// Purchase a number from platform inventory or import an existing one.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<CreateAction>,
    Json(req): Json<CreateNumberRequest>,
) -> Result<Json<PhoneNumber>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;

    let inbound_agent_id =
        remote_agent_for(pool, &identity.organization_id, req.inbound_bot_id.as_deref()).await?;
    let outbound_agent_id =
        remote_agent_for(pool, &identity.organization_id, req.outbound_bot_id.as_deref()).await?;

    let remote = match query.action.as_deref().unwrap_or("purchase") {
        "purchase" => {
            client
                .create_phone_number(&CreatePhoneNumberParams {
                    area_code: req.area_code.clone(),
                    nickname: req.nickname.clone(),
                    inbound_agent_id,
                    outbound_agent_id,
                })
                .await?
        }
        "import" => {
            let number = req
                .number
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    ApiError::Validation("number is required for import".to_string())
                })?;
            client
                .import_phone_number(&ImportPhoneNumberParams {
                    phone_number: number.to_string(),
                    termination_uri: req.termination_uri.clone(),
                    nickname: req.nickname.clone(),
                    inbound_agent_id,
                    outbound_agent_id,
                })
                .await?
        }
        other => {
            return Err(ApiError::Validation(format!(
                "unknown action: {other} (expected purchase or import)"
            )))
        }
    };

    let number = remote
        .phone_number
        .or(req.number)
        .ok_or_else(|| ApiError::Internal("platform returned no phone number".to_string()))?;

    let row = PhoneNumber {
        id: Uuid::new_v4().to_string(),
        organization_id: identity.organization_id.clone(),
        number,
        remote_phone_number_id: remote.phone_number_id,
        nickname: req.nickname,
        inbound_bot_id: req.inbound_bot_id,
        outbound_bot_id: req.outbound_bot_id,
        assigned_user_id: None,
        is_active: true,
        created_at: String::new(),
    };
    phone_number::create_phone_number(pool, &row).await?;
    info!("Provisioned number {} ({})", row.number, row.id);

    Ok(Json(row))
}

/// Fetch one number.
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    Path(number_id): Path<String>,
) -> Result<Json<PhoneNumber>> {
    let found =
        phone_number::get_phone_number(state.db.pool(), &identity.organization_id, &number_id)
            .await?;
    Ok(Json(found))
}

/// Edit a number. A binding change is pushed to the platform before the
/// local row; a number never provisioned remotely updates locally only.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(number_id): Path<String>,
    Json(req): Json<UpdateNumberRequest>,
) -> Result<Json<PhoneNumber>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing =
        phone_number::get_phone_number(pool, &identity.organization_id, &number_id).await?;

    let bindings_change = req.inbound_bot_id != existing.inbound_bot_id
        || req.outbound_bot_id != existing.outbound_bot_id;
    if bindings_change {
        if let Some(remote_id) = existing.remote_phone_number_id.as_deref() {
            let client =
                platform_client_for(pool, &state.config, &identity.organization_id).await?;
            let inbound = remote_agent_for(
                pool,
                &identity.organization_id,
                req.inbound_bot_id.as_deref(),
            )
            .await?;
            let outbound = remote_agent_for(
                pool,
                &identity.organization_id,
                req.outbound_bot_id.as_deref(),
            )
            .await?;
            client
                .update_phone_number(
                    remote_id,
                    &json!({
                        "inbound_agent_id": inbound,
                        "outbound_agent_id": outbound,
                        "nickname": req.nickname.as_ref().or(existing.nickname.as_ref()),
                    }),
                )
                .await?;
        }
    }

    let updated = PhoneNumber {
        nickname: req.nickname.or(existing.nickname),
        inbound_bot_id: req.inbound_bot_id,
        outbound_bot_id: req.outbound_bot_id,
        is_active: req.is_active.unwrap_or(existing.is_active),
        ..existing
    };
    phone_number::update_phone_number(pool, &updated).await?;

    Ok(Json(updated))
}

/// Release a number. Remote release is best-effort, local deletion is not.
pub async fn destroy(
    State(state): State<AppState>,
    identity: Identity,
    Path(number_id): Path<String>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing =
        phone_number::get_phone_number(pool, &identity.organization_id, &number_id).await?;

    if let Some(remote_id) = existing.remote_phone_number_id.as_deref() {
        match platform_client_for(pool, &state.config, &identity.organization_id).await {
            Ok(client) => {
                if let Err(e) = client.delete_phone_number(remote_id).await {
                    warn!("Remote number {} not released: {}", remote_id, e);
                }
            }
            Err(e) => warn!("No platform client for remote release: {}", e),
        }
    }

    phone_number::delete_phone_number(pool, &identity.organization_id, &number_id).await?;
    info!("Deleted number {}", number_id);

    Ok(Json(json!({ "success": true })))
}

/// Assign the number to one of the organization's customers.
pub async fn assign_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(number_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let assignee = user::get_user(pool, &req.user_id).await?;
    if assignee.organization_id != identity.organization_id {
        return Err(ApiError::NotFound(format!("User not found: {}", req.user_id)));
    }

    phone_number::assign_user(
        pool,
        &identity.organization_id,
        &number_id,
        Some(&req.user_id),
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// Clear the number's customer assignment.
pub async fn unassign_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(number_id): Path<String>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    phone_number::assign_user(state.db.pool(), &identity.organization_id, &number_id, None)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Pull the platform's number list and mirror it into local rows.
pub async fn sync(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<sync::SyncSummary>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;
    let summary = sync::sync_phone_numbers(pool, &client, &identity.organization_id).await?;
    info!("Number sync for {}: {}", identity.organization_id, summary);

    Ok(Json(summary))
}

/// Resolve a local bot id to its remote agent id, scoped to the
/// organization. `None` stays `None`; an unknown bot id is a 404.
async fn remote_agent_for(
    pool: &sqlx::SqlitePool,
    organization_id: &str,
    bot_id: Option<&str>,
) -> Result<Option<String>> {
    match bot_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let found = bot::get_bot(pool, organization_id, id).await?;
            Ok(Some(found.remote_agent_id))
        }
        None => Ok(None),
    }
}
