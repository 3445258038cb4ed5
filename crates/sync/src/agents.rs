//! Agent reconciliation: mirror the platform's agents into local bots.

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use database::bot;
use database::models::Bot;
use platform_client::types::{RemoteAgent, RemoteLlm};
use platform_client::PlatformClient;

use crate::error::{Result, SyncError};
use crate::{Reconciled, SyncSummary};

const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_PROMPT: &str = "You are a helpful AI assistant.";
const DEFAULT_BEGIN_MESSAGE: &str = "Hello! How can I help you today?";
const DEFAULT_VOICE: &str = "11labs-Adrian";

/// Mirror every remote agent into the organization's bots.
///
/// Known agents (matched by remote agent id within the organization) are
/// refreshed; unknown ones are imported with `imported_by` as creator and
/// defaults for whatever the platform listing omits. One bad item is
/// reported in the summary and the batch continues; only the listing call
/// itself can fail the sync.
pub async fn sync_agents(
    pool: &SqlitePool,
    client: &PlatformClient,
    organization_id: &str,
    imported_by: &str,
) -> Result<SyncSummary> {
    let remote_agents = client.list_agents().await?;
    info!("Found {} agents on the platform", remote_agents.len());

    let mut summary = SyncSummary::default();
    for item in &remote_agents {
        match reconcile_agent(pool, client, organization_id, imported_by, item).await {
            Ok(Reconciled::Created) => summary.created += 1,
            Ok(Reconciled::Updated) => summary.updated += 1,
            Err(e) => {
                let label = agent_label(item);
                warn!("Skipping agent {}: {}", label, e);
                summary.errors.push(format!("{}: {}", label, e));
                summary.skipped += 1;
            }
        }
    }

    info!("Agent sync completed: {}", summary);
    Ok(summary)
}

async fn reconcile_agent(
    pool: &SqlitePool,
    client: &PlatformClient,
    organization_id: &str,
    imported_by: &str,
    item: &Value,
) -> Result<Reconciled> {
    let remote: RemoteAgent = serde_json::from_value(item.clone())?;
    let agent_id = remote
        .agent_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(SyncError::MissingRemoteId)?;

    let llm_id = remote
        .response_engine
        .as_ref()
        .filter(|engine| engine.engine_type.as_deref() == Some("managed-llm"))
        .and_then(|engine| engine.llm_id.as_deref())
        .filter(|s| !s.is_empty());

    // LLM details are best-effort: an unfetchable config leaves defaults
    // (or the existing values) in place and the agent still syncs.
    let mut llm_details: Option<RemoteLlm> = None;
    if let Some(llm_id) = llm_id {
        match client.get_llm(llm_id).await {
            Ok(remote_llm) => llm_details = Some(remote_llm),
            Err(e) => warn!("Could not fetch LLM details for {}: {}", llm_id, e),
        }
    }
    let (model, general_prompt, begin_message) = match &llm_details {
        Some(llm) => (
            non_empty(llm.model.clone()).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            non_empty(llm.general_prompt.clone()).unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            non_empty(llm.begin_message.clone())
                .unwrap_or_else(|| DEFAULT_BEGIN_MESSAGE.to_string()),
        ),
        None => (
            DEFAULT_MODEL.to_string(),
            DEFAULT_PROMPT.to_string(),
            DEFAULT_BEGIN_MESSAGE.to_string(),
        ),
    };

    match bot::find_by_remote_agent_id(pool, organization_id, agent_id).await? {
        Some(existing) => {
            let mut updated = existing;
            if let Some(name) = non_empty(remote.agent_name) {
                updated.name = name;
            }
            if let Some(voice) = non_empty(remote.voice_id) {
                updated.voice_id = voice;
            }
            if let Some(url) = non_empty(remote.webhook_url) {
                updated.webhook_url = Some(url);
            }
            if llm_details.is_some() {
                updated.model = model;
                updated.general_prompt = general_prompt;
                updated.begin_message = Some(begin_message);
            }
            updated.is_active = true;

            bot::update_bot(pool, &updated).await?;
            info!("Updated bot {} from agent {}", updated.id, agent_id);
            Ok(Reconciled::Updated)
        }
        None => {
            let short: String = agent_id.chars().take(8).collect();
            let imported = Bot {
                id: Uuid::new_v4().to_string(),
                organization_id: organization_id.to_string(),
                created_by: imported_by.to_string(),
                name: non_empty(remote.agent_name)
                    .unwrap_or_else(|| format!("Imported Agent {}", short)),
                description: Some("Imported from the voice platform".to_string()),
                remote_agent_id: agent_id.to_string(),
                remote_llm_id: llm_id.map(|s| s.to_string()),
                voice_id: non_empty(remote.voice_id).unwrap_or_else(|| DEFAULT_VOICE.to_string()),
                model,
                general_prompt,
                begin_message: Some(begin_message),
                webhook_url: non_empty(remote.webhook_url),
                language: non_empty(remote.language).unwrap_or_else(|| "en-US".to_string()),
                custom_tools: None,
                is_active: true,
                created_at: String::new(),
                updated_at: String::new(),
            };

            bot::create_bot(pool, &imported).await?;
            info!("Created bot {} from agent {}", imported.id, agent_id);
            Ok(Reconciled::Created)
        }
    }
}

fn agent_label(item: &Value) -> &str {
    item.get("agent_name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| item.get("agent_id").and_then(Value::as_str))
        .unwrap_or("<unknown agent>")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
