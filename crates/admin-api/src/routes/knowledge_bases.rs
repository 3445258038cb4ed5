//! Knowledge base routes, plus bot assignment endpoints.
//!
//! A knowledge base is created on the platform first and only mirrored
//! locally once the platform accepts it. Assignment endpoints delegate to
//! the linker, which pushes the full recomputed list to the bot's remote
//! LLM config before touching local rows.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use database::models::{BotKnowledgeBase, KnowledgeBase};
use database::knowledge_base;
use platform_client::types::{CreateKnowledgeBaseParams, KnowledgeBaseText};

use crate::credentials::platform_client_for;
use crate::error::{ApiError, Result};
use crate::identity::Identity;
use crate::state::AppState;

const DEFAULT_TOP_K: i64 = 3;
const DEFAULT_FILTER_SCORE: f64 = 0.6;

/// Request to create a knowledge base.
#[derive(serde::Deserialize)]
pub struct CreateKnowledgeBaseRequest {
    pub name: String,
    #[serde(default)]
    pub texts: Vec<KnowledgeBaseText>,
    #[serde(default)]
    pub enable_auto_refresh: bool,
}

/// Request to edit a knowledge base.
#[derive(serde::Deserialize)]
pub struct UpdateKnowledgeBaseRequest {
    pub name: Option<String>,
    pub texts: Option<Vec<KnowledgeBaseText>>,
    pub enable_auto_refresh: Option<bool>,
}

/// Request to attach a knowledge base to a bot.
#[derive(serde::Deserialize)]
pub struct AssignRequest {
    pub knowledge_base_id: String,
    pub top_k: Option<i64>,
    pub filter_score: Option<f64>,
}

/// List the organization's knowledge bases.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<KnowledgeBase>>> {
    let bases =
        knowledge_base::list_knowledge_bases(state.db.pool(), &identity.organization_id).await?;
    Ok(Json(bases))
}

/// Create a knowledge base on the platform, then mirror it locally.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateKnowledgeBaseRequest>,
) -> Result<Json<KnowledgeBase>> {
    identity.require_admin()?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;

    let remote = client
        .create_knowledge_base(&CreateKnowledgeBaseParams {
            knowledge_base_name: req.name.clone(),
            knowledge_base_texts: req.texts.clone(),
            enable_auto_refresh: req.enable_auto_refresh,
        })
        .await?;

    let remote_id = remote.knowledge_base_id.ok_or_else(|| {
        ApiError::Internal("platform returned no knowledge base id".to_string())
    })?;

    let kb = KnowledgeBase {
        id: Uuid::new_v4().to_string(),
        organization_id: identity.organization_id.clone(),
        remote_knowledge_base_id: remote_id,
        name: req.name,
        texts: Some(serde_json::to_string(&req.texts).unwrap_or_else(|_| "[]".to_string())),
        enable_auto_refresh: req.enable_auto_refresh,
        created_at: String::new(),
    };
    knowledge_base::create_knowledge_base(pool, &kb).await?;
    info!("Created knowledge base {} ({})", kb.name, kb.id);

    Ok(Json(kb))
}

/// Fetch one knowledge base.
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    Path(knowledge_base_id): Path<String>,
) -> Result<Json<KnowledgeBase>> {
    let kb = knowledge_base::get_knowledge_base(
        state.db.pool(),
        &identity.organization_id,
        &knowledge_base_id,
    )
    .await?;
    Ok(Json(kb))
}

/// Edit a knowledge base. The platform is patched before the local row,
/// so a rejected patch leaves both sides unchanged.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(knowledge_base_id): Path<String>,
    Json(req): Json<UpdateKnowledgeBaseRequest>,
) -> Result<Json<KnowledgeBase>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing = knowledge_base::get_knowledge_base(
        pool,
        &identity.organization_id,
        &knowledge_base_id,
    )
    .await?;

    let mut patch = serde_json::Map::new();
    if let Some(name) = &req.name {
        patch.insert("knowledge_base_name".to_string(), json!(name));
    }
    if let Some(texts) = &req.texts {
        patch.insert("knowledge_base_texts".to_string(), json!(texts));
    }
    if let Some(auto) = req.enable_auto_refresh {
        patch.insert("enable_auto_refresh".to_string(), json!(auto));
    }
    if !patch.is_empty() {
        let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;
        client
            .update_knowledge_base(&existing.remote_knowledge_base_id, &Value::Object(patch))
            .await?;
    }

    let texts = match &req.texts {
        Some(texts) => {
            Some(serde_json::to_string(texts).unwrap_or_else(|_| "[]".to_string()))
        }
        None => existing.texts.clone(),
    };
    let updated = KnowledgeBase {
        name: req.name.unwrap_or_else(|| existing.name.clone()),
        texts,
        enable_auto_refresh: req.enable_auto_refresh.unwrap_or(existing.enable_auto_refresh),
        ..existing
    };
    knowledge_base::update_knowledge_base(pool, &updated).await?;

    Ok(Json(updated))
}

/// Delete a knowledge base. Remote deletion is best-effort; local rows
/// (and assignments, via cascade) go regardless.
pub async fn destroy(
    State(state): State<AppState>,
    identity: Identity,
    Path(knowledge_base_id): Path<String>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing = knowledge_base::get_knowledge_base(
        pool,
        &identity.organization_id,
        &knowledge_base_id,
    )
    .await?;

    match platform_client_for(pool, &state.config, &identity.organization_id).await {
        Ok(client) => {
            if let Err(e) = client
                .delete_knowledge_base(&existing.remote_knowledge_base_id)
                .await
            {
                warn!(
                    "Remote knowledge base {} not deleted: {}",
                    existing.remote_knowledge_base_id, e
                );
            }
        }
        Err(e) => warn!("No platform client for remote deletion: {}", e),
    }

    knowledge_base::delete_knowledge_base(pool, &identity.organization_id, &knowledge_base_id)
        .await?;
    info!("Deleted knowledge base {}", knowledge_base_id);

    Ok(Json(json!({ "success": true })))
}

/// List a bot's knowledge base assignments.
pub async fn list_assignments(
    State(state): State<AppState>,
    identity: Identity,
    Path(bot_id): Path<String>,
) -> Result<Json<Vec<BotKnowledgeBase>>> {
    let pool = state.db.pool();
    // Scope check before the unscoped assignment query.
    database::bot::get_bot(pool, &identity.organization_id, &bot_id).await?;
    let assignments = knowledge_base::list_assignments(pool, &bot_id).await?;
    Ok(Json(assignments))
}

/// Attach a knowledge base to a bot via the linker.
pub async fn assign(
    State(state): State<AppState>,
    identity: Identity,
    Path(bot_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<BotKnowledgeBase>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;
    let assignment = sync::knowledge::assign(
        pool,
        &client,
        &identity.organization_id,
        &bot_id,
        &req.knowledge_base_id,
        req.top_k.unwrap_or(DEFAULT_TOP_K),
        req.filter_score.unwrap_or(DEFAULT_FILTER_SCORE),
    )
    .await?;

    Ok(Json(assignment))
}

/// Detach an assignment via the linker.
pub async fn unassign(
    State(state): State<AppState>,
    identity: Identity,
    Path((bot_id, assignment_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;
    sync::knowledge::unassign(
        pool,
        &client,
        &identity.organization_id,
        &bot_id,
        &assignment_id,
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}
