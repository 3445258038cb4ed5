//! Knowledge-base assignment linking.
//!
//! Assignment state lives in two places: local `bot_knowledge_bases` rows
//! and the `knowledge_base_ids` list on the bot's remote LLM config. Every
//! change recomputes the full prospective list and pushes it to the
//! platform before touching the local row, so a rejected push leaves both
//! sides as they were.

use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use database::models::BotKnowledgeBase;
use database::{bot, knowledge_base, DatabaseError};
use platform_client::types::KnowledgeBaseRef;
use platform_client::PlatformClient;

use crate::error::{Result, SyncError};

/// Attach a knowledge base to a bot.
///
/// Both sides must belong to `organization_id`, the pair must not be
/// linked yet, and the bot needs a remote LLM config to push the list to.
pub async fn assign(
    pool: &SqlitePool,
    client: &PlatformClient,
    organization_id: &str,
    bot_id: &str,
    knowledge_base_id: &str,
    top_k: i64,
    filter_score: f64,
) -> Result<BotKnowledgeBase> {
    let the_bot = bot::get_bot(pool, organization_id, bot_id).await?;
    let kb = knowledge_base::get_knowledge_base(pool, organization_id, knowledge_base_id).await?;

    let current = knowledge_base::list_assignments_with_remote(pool, bot_id).await?;
    if current
        .iter()
        .any(|a| a.knowledge_base_id == knowledge_base_id)
    {
        return Err(SyncError::Database(DatabaseError::AlreadyExists {
            entity: "BotKnowledgeBase",
            id: knowledge_base_id.to_string(),
        }));
    }

    let mut refs = remote_refs(&current);
    refs.push(KnowledgeBaseRef {
        knowledge_base_id: kb.remote_knowledge_base_id.clone(),
        top_k,
        filter_score,
    });
    push_assignments(client, &the_bot, refs).await?;

    let assignment = BotKnowledgeBase {
        id: Uuid::new_v4().to_string(),
        bot_id: bot_id.to_string(),
        knowledge_base_id: knowledge_base_id.to_string(),
        top_k,
        filter_score,
        created_at: String::new(),
    };
    knowledge_base::create_assignment(pool, &assignment).await?;
    info!(
        "Assigned knowledge base {} to bot {}",
        knowledge_base_id, bot_id
    );

    Ok(assignment)
}

/// Detach one assignment from a bot. The remaining list (possibly empty)
/// is pushed to the remote LLM config first.
pub async fn unassign(
    pool: &SqlitePool,
    client: &PlatformClient,
    organization_id: &str,
    bot_id: &str,
    assignment_id: &str,
) -> Result<()> {
    let the_bot = bot::get_bot(pool, organization_id, bot_id).await?;
    let assignment = knowledge_base::get_assignment(pool, bot_id, assignment_id).await?;

    let remaining: Vec<_> = knowledge_base::list_assignments_with_remote(pool, bot_id)
        .await?
        .into_iter()
        .filter(|a| a.id != assignment_id)
        .collect();
    push_assignments(client, &the_bot, remote_refs(&remaining)).await?;

    knowledge_base::delete_assignment(pool, bot_id, assignment_id).await?;
    info!(
        "Unassigned knowledge base {} from bot {}",
        assignment.knowledge_base_id, bot_id
    );

    Ok(())
}

fn remote_refs(assignments: &[knowledge_base::AssignmentWithRemote]) -> Vec<KnowledgeBaseRef> {
    assignments
        .iter()
        .map(|a| KnowledgeBaseRef {
            knowledge_base_id: a.remote_knowledge_base_id.clone(),
            top_k: a.top_k,
            filter_score: a.filter_score,
        })
        .collect()
}

async fn push_assignments(
    client: &PlatformClient,
    the_bot: &database::models::Bot,
    refs: Vec<KnowledgeBaseRef>,
) -> Result<()> {
    let remote_llm_id = the_bot
        .remote_llm_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SyncError::MissingRemoteLlm {
            bot_id: the_bot.id.clone(),
        })?;

    client
        .update_llm(remote_llm_id, &json!({ "knowledge_base_ids": refs }))
        .await?;

    Ok(())
}
