//! Bot provisioning and sync routes.
//!
//! Provisioning is remote-first: the platform resources (LLM config, then
//! agent) are created or patched before the local row, so a platform
//! failure leaves no local row pointing at nothing. Deletion is the
//! mirror image: local deletion proceeds even when the platform refuses,
//! because an orphaned remote resource is recoverable and an undeletable
//! local row is not.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use database::models::Bot;
use database::{bot, user};
use platform_client::types::{CreateAgentParams, CreateLlmParams, ResponseEngine};

use crate::credentials::platform_client_for;
use crate::error::{ApiError, Result};
use crate::identity::Identity;
use crate::state::AppState;

const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_PROMPT: &str = "You are a helpful AI assistant.";
const DEFAULT_VOICE: &str = "11labs-Adrian";
const DEFAULT_LANGUAGE: &str = "en-US";

/// Request to provision a bot.
#[derive(serde::Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub description: Option<String>,
    pub voice_id: Option<String>,
    pub model: Option<String>,
    pub general_prompt: Option<String>,
    pub begin_message: Option<String>,
    pub language: Option<String>,
    /// Custom tool definitions in the platform's shape.
    pub custom_tools: Option<Value>,
}

/// Request to edit a bot. Absent fields keep their value.
#[derive(serde::Deserialize)]
pub struct UpdateBotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub voice_id: Option<String>,
    pub model: Option<String>,
    pub general_prompt: Option<String>,
    pub begin_message: Option<String>,
    pub language: Option<String>,
    pub custom_tools: Option<Value>,
    pub is_active: Option<bool>,
}

/// List the organization's bots.
pub async fn list(State(state): State<AppState>, identity: Identity) -> Result<Json<Vec<Bot>>> {
    let bots = bot::list_bots(state.db.pool(), &identity.organization_id).await?;
    Ok(Json(bots))
}

/// Provision a bot: create the remote LLM config and agent, then the
/// local row.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateBotRequest>,
) -> Result<Json<Bot>> {
    identity.require_admin()?;
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let pool = state.db.pool();
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;

    let model = req.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let general_prompt = req
        .general_prompt
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
    let voice_id = req.voice_id.unwrap_or_else(|| DEFAULT_VOICE.to_string());
    let language = req.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let webhook_url = state.config.webhook_url();

    let llm = client
        .create_llm(&CreateLlmParams {
            model: model.clone(),
            general_prompt: general_prompt.clone(),
            begin_message: req.begin_message.clone(),
            general_tools: req.custom_tools.clone(),
        })
        .await?;
    let remote_llm_id = llm.llm_id.ok_or_else(|| {
        ApiError::Internal("platform returned an LLM config without an id".to_string())
    })?;

    let agent = client
        .create_agent(&CreateAgentParams {
            agent_name: req.name.clone(),
            voice_id: voice_id.clone(),
            language: language.clone(),
            response_engine: ResponseEngine::managed_llm(&remote_llm_id),
            webhook_url: Some(webhook_url.clone()),
        })
        .await?;
    let remote_agent_id = agent.agent_id.ok_or_else(|| {
        ApiError::Internal("platform returned an agent without an id".to_string())
    })?;

    let new_bot = Bot {
        id: Uuid::new_v4().to_string(),
        organization_id: identity.organization_id.clone(),
        created_by: identity.user_id.clone(),
        name: req.name,
        description: req.description,
        remote_agent_id,
        remote_llm_id: Some(remote_llm_id),
        voice_id,
        model,
        general_prompt,
        begin_message: req.begin_message,
        webhook_url: Some(webhook_url),
        language,
        custom_tools: req.custom_tools.map(|t| t.to_string()),
        is_active: true,
        created_at: String::new(),
        updated_at: String::new(),
    };
    bot::create_bot(pool, &new_bot).await?;
    info!("Provisioned bot {} ({})", new_bot.id, new_bot.remote_agent_id);

    Ok(Json(new_bot))
}

/// Fetch one bot.
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    Path(bot_id): Path<String>,
) -> Result<Json<Bot>> {
    let found = bot::get_bot(state.db.pool(), &identity.organization_id, &bot_id).await?;
    Ok(Json(found))
}

/// Edit a bot. Remote patches go first; the local row only changes after
/// the platform accepted.
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(bot_id): Path<String>,
    Json(req): Json<UpdateBotRequest>,
) -> Result<Json<Bot>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing = bot::get_bot(pool, &identity.organization_id, &bot_id).await?;
    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;

    // Agent-level patch, only for fields that actually change.
    let mut agent_patch = serde_json::Map::new();
    if let Some(name) = req.name.as_ref().filter(|v| **v != existing.name) {
        agent_patch.insert("agent_name".to_string(), json!(name));
    }
    if let Some(voice) = req.voice_id.as_ref().filter(|v| **v != existing.voice_id) {
        agent_patch.insert("voice_id".to_string(), json!(voice));
    }
    if let Some(language) = req.language.as_ref().filter(|v| **v != existing.language) {
        agent_patch.insert("language".to_string(), json!(language));
    }
    if !agent_patch.is_empty() {
        client
            .update_agent(&existing.remote_agent_id, &Value::Object(agent_patch))
            .await?;
    }

    // LLM-level patch for prompt / model / opening line / tools.
    let mut llm_patch = serde_json::Map::new();
    if let Some(model) = req.model.as_ref().filter(|v| **v != existing.model) {
        llm_patch.insert("model".to_string(), json!(model));
    }
    if let Some(prompt) = req
        .general_prompt
        .as_ref()
        .filter(|v| **v != existing.general_prompt)
    {
        llm_patch.insert("general_prompt".to_string(), json!(prompt));
    }
    if let Some(begin) = req
        .begin_message
        .as_ref()
        .filter(|v| Some(*v) != existing.begin_message.as_ref())
    {
        llm_patch.insert("begin_message".to_string(), json!(begin));
    }
    if let Some(tools) = req.custom_tools.as_ref() {
        llm_patch.insert("general_tools".to_string(), tools.clone());
    }
    if !llm_patch.is_empty() {
        let llm_id = existing.remote_llm_id.as_deref().ok_or_else(|| {
            ApiError::Validation(format!("bot {bot_id} has no remote LLM config"))
        })?;
        client.update_llm(llm_id, &Value::Object(llm_patch)).await?;
    }

    let updated = Bot {
        name: req.name.unwrap_or(existing.name),
        description: req.description.or(existing.description),
        voice_id: req.voice_id.unwrap_or(existing.voice_id),
        model: req.model.unwrap_or(existing.model),
        general_prompt: req.general_prompt.unwrap_or(existing.general_prompt),
        begin_message: req.begin_message.or(existing.begin_message),
        language: req.language.unwrap_or(existing.language),
        custom_tools: req
            .custom_tools
            .map(|t| t.to_string())
            .or(existing.custom_tools),
        is_active: req.is_active.unwrap_or(existing.is_active),
        ..existing
    };
    bot::update_bot(pool, &updated).await?;

    Ok(Json(updated))
}

/// Delete a bot. Remote resources are removed best-effort; the local row
/// goes regardless, cascading calls and assignments.
pub async fn destroy(
    State(state): State<AppState>,
    identity: Identity,
    Path(bot_id): Path<String>,
) -> Result<Json<Value>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    let existing = bot::get_bot(pool, &identity.organization_id, &bot_id).await?;

    match platform_client_for(pool, &state.config, &identity.organization_id).await {
        Ok(client) => {
            if let Err(e) = client.delete_agent(&existing.remote_agent_id).await {
                warn!(
                    "Remote agent {} not deleted: {}",
                    existing.remote_agent_id, e
                );
            }
            if let Some(llm_id) = existing.remote_llm_id.as_deref() {
                if let Err(e) = client.delete_llm(llm_id).await {
                    warn!("Remote LLM config {} not deleted: {}", llm_id, e);
                }
            }
        }
        Err(e) => warn!("No platform client for remote deletion: {}", e),
    }

    bot::delete_bot(pool, &identity.organization_id, &bot_id).await?;
    info!("Deleted bot {}", bot_id);

    Ok(Json(json!({ "success": true })))
}

/// Pull the platform's agent list and mirror it into local bots.
pub async fn sync(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<sync::SyncSummary>> {
    identity.require_admin()?;

    let pool = state.db.pool();
    // The importer must exist: imported bots reference it as creator.
    user::get_user(pool, &identity.user_id).await?;

    let client = platform_client_for(pool, &state.config, &identity.organization_id).await?;
    let summary =
        sync::sync_agents(pool, &client, &identity.organization_id, &identity.user_id).await?;
    info!("Agent sync for {}: {}", identity.organization_id, summary);

    Ok(Json(summary))
}
