//! Organization CRUD operations.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::Organization;

/// Create a new organization.
pub async fn create_organization(pool: &SqlitePool, org: &Organization) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO organizations (id, name, slug, api_key, webhook_secret, monthly_call_minutes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&org.id)
    .bind(&org.name)
    .bind(&org.slug)
    .bind(&org.api_key)
    .bind(&org.webhook_secret)
    .bind(org.monthly_call_minutes)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "Organization", &org.id))?;

    Ok(())
}

/// Get an organization by ID.
pub async fn get_organization(pool: &SqlitePool, id: &str) -> Result<Organization> {
    sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, slug, api_key, webhook_secret, monthly_call_minutes, created_at
        FROM organizations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Organization",
        id: id.to_string(),
    })
}

/// Get an organization by slug.
pub async fn get_organization_by_slug(pool: &SqlitePool, slug: &str) -> Result<Organization> {
    sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, slug, api_key, webhook_secret, monthly_call_minutes, created_at
        FROM organizations
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Organization",
        id: slug.to_string(),
    })
}

/// Update an organization's credentials. `None` clears the override so the
/// process-wide fallback applies again.
pub async fn update_credentials(
    pool: &SqlitePool,
    id: &str,
    api_key: Option<&str>,
    webhook_secret: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE organizations
        SET api_key = ?, webhook_secret = ?
        WHERE id = ?
        "#,
    )
    .bind(api_key)
    .bind(webhook_secret)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Organization",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Add whole minutes to the organization's monthly usage counter.
///
/// Takes a connection so lifecycle processing can include the increment in
/// the same transaction as the call update.
pub async fn add_call_minutes(conn: &mut SqliteConnection, id: &str, minutes: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE organizations
        SET monthly_call_minutes = monthly_call_minutes + ?
        WHERE id = ?
        "#,
    )
    .bind(minutes)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Organization",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_usage_counter_accumulates() {
        let db = test_db().await;
        let org = Organization {
            id: "org-a".to_string(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            api_key: Some("key_1234secret5678".to_string()),
            webhook_secret: None,
            monthly_call_minutes: 0,
            created_at: String::new(),
        };
        create_organization(db.pool(), &org).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        add_call_minutes(&mut conn, "org-a", 3).await.unwrap();
        add_call_minutes(&mut conn, "org-a", 2).await.unwrap();

        let fetched = get_organization(db.pool(), "org-a").await.unwrap();
        assert_eq!(fetched.monthly_call_minutes, 5);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = test_db().await;
        let org = Organization {
            id: "org-a".to_string(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            api_key: None,
            webhook_secret: None,
            monthly_call_minutes: 0,
            created_at: String::new(),
        };
        create_organization(db.pool(), &org).await.unwrap();

        let dup = Organization {
            id: "org-b".to_string(),
            ..org.clone()
        };
        let result = create_organization(db.pool(), &dup).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }
}
