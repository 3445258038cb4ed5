//! Knowledge bases and their bot assignments.

use sqlx::SqlitePool;

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::{BotKnowledgeBase, KnowledgeBase};

/// Create a new knowledge base.
pub async fn create_knowledge_base(pool: &SqlitePool, kb: &KnowledgeBase) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO knowledge_bases (
            id, organization_id, remote_knowledge_base_id, name, texts,
            enable_auto_refresh
        )
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&kb.id)
    .bind(&kb.organization_id)
    .bind(&kb.remote_knowledge_base_id)
    .bind(&kb.name)
    .bind(&kb.texts)
    .bind(kb.enable_auto_refresh)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "KnowledgeBase", &kb.id))?;

    Ok(())
}

/// Get a knowledge base by ID within an organization.
pub async fn get_knowledge_base(
    pool: &SqlitePool,
    organization_id: &str,
    id: &str,
) -> Result<KnowledgeBase> {
    sqlx::query_as::<_, KnowledgeBase>(
        r#"
        SELECT id, organization_id, remote_knowledge_base_id, name, texts,
               enable_auto_refresh, created_at
        FROM knowledge_bases
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "KnowledgeBase",
        id: id.to_string(),
    })
}

/// Update a knowledge base's name, texts, and refresh flag.
pub async fn update_knowledge_base(pool: &SqlitePool, kb: &KnowledgeBase) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE knowledge_bases
        SET name = ?, texts = ?, enable_auto_refresh = ?
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(&kb.name)
    .bind(&kb.texts)
    .bind(kb.enable_auto_refresh)
    .bind(&kb.organization_id)
    .bind(&kb.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeBase",
            id: kb.id.clone(),
        });
    }

    Ok(())
}

/// Delete a knowledge base. Assignments cascade.
pub async fn delete_knowledge_base(
    pool: &SqlitePool,
    organization_id: &str,
    id: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM knowledge_bases
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "KnowledgeBase",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List an organization's knowledge bases.
pub async fn list_knowledge_bases(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Vec<KnowledgeBase>> {
    let kbs = sqlx::query_as::<_, KnowledgeBase>(
        r#"
        SELECT id, organization_id, remote_knowledge_base_id, name, texts,
               enable_auto_refresh, created_at
        FROM knowledge_bases
        WHERE organization_id = ?
        ORDER BY name
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(kbs)
}

/// One row of a bot's assignment list joined with the remote id the
/// platform needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentWithRemote {
    pub id: String,
    pub knowledge_base_id: String,
    pub remote_knowledge_base_id: String,
    pub top_k: i64,
    pub filter_score: f64,
}

/// Create an assignment. Fails with `AlreadyExists` when the pair is
/// already linked.
pub async fn create_assignment(pool: &SqlitePool, assignment: &BotKnowledgeBase) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO bot_knowledge_bases (id, bot_id, knowledge_base_id, top_k, filter_score)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&assignment.id)
    .bind(&assignment.bot_id)
    .bind(&assignment.knowledge_base_id)
    .bind(assignment.top_k)
    .bind(assignment.filter_score)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "BotKnowledgeBase", &assignment.knowledge_base_id))?;

    Ok(())
}

/// Get one assignment of a bot.
pub async fn get_assignment(
    pool: &SqlitePool,
    bot_id: &str,
    assignment_id: &str,
) -> Result<BotKnowledgeBase> {
    sqlx::query_as::<_, BotKnowledgeBase>(
        r#"
        SELECT id, bot_id, knowledge_base_id, top_k, filter_score, created_at
        FROM bot_knowledge_bases
        WHERE bot_id = ? AND id = ?
        "#,
    )
    .bind(bot_id)
    .bind(assignment_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "BotKnowledgeBase",
        id: assignment_id.to_string(),
    })
}

/// List a bot's assignments.
pub async fn list_assignments(pool: &SqlitePool, bot_id: &str) -> Result<Vec<BotKnowledgeBase>> {
    let assignments = sqlx::query_as::<_, BotKnowledgeBase>(
        r#"
        SELECT id, bot_id, knowledge_base_id, top_k, filter_score, created_at
        FROM bot_knowledge_bases
        WHERE bot_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(bot_id)
    .fetch_all(pool)
    .await?;

    Ok(assignments)
}

/// List a bot's assignments joined with each knowledge base's remote id.
/// The linker pushes this list to the platform whenever it changes.
pub async fn list_assignments_with_remote(
    pool: &SqlitePool,
    bot_id: &str,
) -> Result<Vec<AssignmentWithRemote>> {
    let rows = sqlx::query_as::<_, AssignmentWithRemote>(
        r#"
        SELECT a.id, a.knowledge_base_id, k.remote_knowledge_base_id,
               a.top_k, a.filter_score
        FROM bot_knowledge_bases a
        JOIN knowledge_bases k ON k.id = a.knowledge_base_id
        WHERE a.bot_id = ?
        ORDER BY a.rowid
        "#,
    )
    .bind(bot_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete one assignment of a bot.
pub async fn delete_assignment(pool: &SqlitePool, bot_id: &str, assignment_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM bot_knowledge_bases
        WHERE bot_id = ? AND id = ?
        "#,
    )
    .bind(bot_id)
    .bind(assignment_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "BotKnowledgeBase",
            id: assignment_id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_call_chain, test_db};

    fn sample_kb(org_id: &str, id: &str, remote: &str) -> KnowledgeBase {
        KnowledgeBase {
            id: id.to_string(),
            organization_id: org_id.to_string(),
            remote_knowledge_base_id: remote.to_string(),
            name: format!("KB {id}"),
            texts: Some(r#"[{"title":"FAQ","text":"We open at 9."}]"#.to_string()),
            enable_auto_refresh: false,
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_assignment_rejected() {
        let db = test_db().await;
        let (org_id, _, bot_id, _) = seed_call_chain(&db).await;
        create_knowledge_base(db.pool(), &sample_kb(&org_id, "kb-1", "rkb_1")).await.unwrap();

        let assignment = BotKnowledgeBase {
            id: "as-1".to_string(),
            bot_id: bot_id.clone(),
            knowledge_base_id: "kb-1".to_string(),
            top_k: 3,
            filter_score: 0.6,
            created_at: String::new(),
        };
        create_assignment(db.pool(), &assignment).await.unwrap();

        let dup = BotKnowledgeBase {
            id: "as-2".to_string(),
            ..assignment.clone()
        };
        let result = create_assignment(db.pool(), &dup).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_assignment_list_carries_remote_ids() {
        let db = test_db().await;
        let (org_id, _, bot_id, _) = seed_call_chain(&db).await;
        create_knowledge_base(db.pool(), &sample_kb(&org_id, "kb-1", "rkb_1")).await.unwrap();
        create_knowledge_base(db.pool(), &sample_kb(&org_id, "kb-2", "rkb_2")).await.unwrap();

        for (i, kb) in ["kb-1", "kb-2"].iter().enumerate() {
            create_assignment(
                db.pool(),
                &BotKnowledgeBase {
                    id: format!("as-{i}"),
                    bot_id: bot_id.clone(),
                    knowledge_base_id: kb.to_string(),
                    top_k: 3,
                    filter_score: 0.6,
                    created_at: String::new(),
                },
            )
            .await
            .unwrap();
        }

        let rows = list_assignments_with_remote(db.pool(), &bot_id).await.unwrap();
        let remotes: Vec<&str> = rows.iter().map(|r| r.remote_knowledge_base_id.as_str()).collect();
        assert_eq!(remotes, vec!["rkb_1", "rkb_2"]);
    }
}
