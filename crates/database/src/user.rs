//! User CRUD operations.
//!
//! Users belong to an organization and carry a role. Authentication lives
//! in the fronting auth layer; these rows are profile data.

use sqlx::SqlitePool;

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::User;

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, organization_id, email, name, role, customer_type)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.organization_id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.role)
    .bind(&user.customer_type)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "User", &user.id))?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, organization_id, email, name, role, customer_type, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, organization_id, email, name, role, customer_type, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.to_string(),
    })
}

/// List users of an organization.
pub async fn list_users(pool: &SqlitePool, organization_id: &str) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, organization_id, email, name, role, customer_type, created_at
        FROM users
        WHERE organization_id = ?
        ORDER BY name
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// First user of an organization by creation order, if any.
///
/// Used when a call has to be attributed to someone and the webhook gives
/// no user context.
pub async fn first_user_for_organization(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, organization_id, email, name, role, customer_type, created_at
        FROM users
        WHERE organization_id = ?
        ORDER BY created_at, id
        LIMIT 1
        "#,
    )
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
