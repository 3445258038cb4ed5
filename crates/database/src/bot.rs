//! Bot CRUD operations.

use sqlx::SqlitePool;

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::Bot;

/// Create a new bot.
pub async fn create_bot(pool: &SqlitePool, bot: &Bot) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO bots (
            id, organization_id, created_by, name, description, remote_agent_id,
            remote_llm_id, voice_id, model, general_prompt, begin_message,
            webhook_url, language, custom_tools, is_active
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bot.id)
    .bind(&bot.organization_id)
    .bind(&bot.created_by)
    .bind(&bot.name)
    .bind(&bot.description)
    .bind(&bot.remote_agent_id)
    .bind(&bot.remote_llm_id)
    .bind(&bot.voice_id)
    .bind(&bot.model)
    .bind(&bot.general_prompt)
    .bind(&bot.begin_message)
    .bind(&bot.webhook_url)
    .bind(&bot.language)
    .bind(&bot.custom_tools)
    .bind(bot.is_active)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "Bot", &bot.id))?;

    Ok(())
}

/// Get a bot by ID within an organization.
pub async fn get_bot(pool: &SqlitePool, organization_id: &str, id: &str) -> Result<Bot> {
    sqlx::query_as::<_, Bot>(
        r#"
        SELECT id, organization_id, created_by, name, description, remote_agent_id,
               remote_llm_id, voice_id, model, general_prompt, begin_message,
               webhook_url, language, custom_tools, is_active, created_at, updated_at
        FROM bots
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Bot",
        id: id.to_string(),
    })
}

/// Find a bot by its remote agent id within an organization.
pub async fn find_by_remote_agent_id(
    pool: &SqlitePool,
    organization_id: &str,
    remote_agent_id: &str,
) -> Result<Option<Bot>> {
    let bot = sqlx::query_as::<_, Bot>(
        r#"
        SELECT id, organization_id, created_by, name, description, remote_agent_id,
               remote_llm_id, voice_id, model, general_prompt, begin_message,
               webhook_url, language, custom_tools, is_active, created_at, updated_at
        FROM bots
        WHERE organization_id = ? AND remote_agent_id = ?
        "#,
    )
    .bind(organization_id)
    .bind(remote_agent_id)
    .fetch_optional(pool)
    .await?;

    Ok(bot)
}

/// Find a bot by its remote agent id across all organizations.
///
/// Call recovery uses this: mid-call tool invocations identify the agent
/// but carry no tenant.
pub async fn find_by_remote_agent_id_any_org(
    pool: &SqlitePool,
    remote_agent_id: &str,
) -> Result<Option<Bot>> {
    let bot = sqlx::query_as::<_, Bot>(
        r#"
        SELECT id, organization_id, created_by, name, description, remote_agent_id,
               remote_llm_id, voice_id, model, general_prompt, begin_message,
               webhook_url, language, custom_tools, is_active, created_at, updated_at
        FROM bots
        WHERE remote_agent_id = ?
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .bind(remote_agent_id)
    .fetch_optional(pool)
    .await?;

    Ok(bot)
}

/// Update an existing bot. Overwrites every mutable column.
pub async fn update_bot(pool: &SqlitePool, bot: &Bot) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE bots
        SET name = ?, description = ?, remote_llm_id = ?, voice_id = ?, model = ?,
            general_prompt = ?, begin_message = ?, webhook_url = ?, language = ?,
            custom_tools = ?, is_active = ?, updated_at = CURRENT_TIMESTAMP
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(&bot.name)
    .bind(&bot.description)
    .bind(&bot.remote_llm_id)
    .bind(&bot.voice_id)
    .bind(&bot.model)
    .bind(&bot.general_prompt)
    .bind(&bot.begin_message)
    .bind(&bot.webhook_url)
    .bind(&bot.language)
    .bind(&bot.custom_tools)
    .bind(bot.is_active)
    .bind(&bot.organization_id)
    .bind(&bot.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: bot.id.clone(),
        });
    }

    Ok(())
}

/// Delete a bot by ID within an organization. Calls and knowledge-base
/// assignments cascade; phone-number bindings are cleared.
pub async fn delete_bot(pool: &SqlitePool, organization_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM bots
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Bot",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List bots of an organization, newest first.
pub async fn list_bots(pool: &SqlitePool, organization_id: &str) -> Result<Vec<Bot>> {
    let bots = sqlx::query_as::<_, Bot>(
        r#"
        SELECT id, organization_id, created_by, name, description, remote_agent_id,
               remote_llm_id, voice_id, model, general_prompt, begin_message,
               webhook_url, language, custom_tools, is_active, created_at, updated_at
        FROM bots
        WHERE organization_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(bots)
}
