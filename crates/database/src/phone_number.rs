//! Phone number CRUD operations.

use sqlx::SqlitePool;

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::PhoneNumber;

/// Create a new phone number.
pub async fn create_phone_number(pool: &SqlitePool, number: &PhoneNumber) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO phone_numbers (
            id, organization_id, number, remote_phone_number_id, nickname,
            inbound_bot_id, outbound_bot_id, assigned_user_id, is_active
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&number.id)
    .bind(&number.organization_id)
    .bind(&number.number)
    .bind(&number.remote_phone_number_id)
    .bind(&number.nickname)
    .bind(&number.inbound_bot_id)
    .bind(&number.outbound_bot_id)
    .bind(&number.assigned_user_id)
    .bind(number.is_active)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "PhoneNumber", &number.number))?;

    Ok(())
}

/// Get a phone number by ID within an organization.
pub async fn get_phone_number(
    pool: &SqlitePool,
    organization_id: &str,
    id: &str,
) -> Result<PhoneNumber> {
    sqlx::query_as::<_, PhoneNumber>(
        r#"
        SELECT id, organization_id, number, remote_phone_number_id, nickname,
               inbound_bot_id, outbound_bot_id, assigned_user_id, is_active, created_at
        FROM phone_numbers
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "PhoneNumber",
        id: id.to_string(),
    })
}

/// Find a phone number by its E.164 string, across organizations.
///
/// Numbers are globally unique; reconciliation uses this to claim rows
/// whose ownership moved on the platform side.
pub async fn find_by_number(pool: &SqlitePool, number: &str) -> Result<Option<PhoneNumber>> {
    let row = sqlx::query_as::<_, PhoneNumber>(
        r#"
        SELECT id, organization_id, number, remote_phone_number_id, nickname,
               inbound_bot_id, outbound_bot_id, assigned_user_id, is_active, created_at
        FROM phone_numbers
        WHERE number = ?
        "#,
    )
    .bind(number)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Update an existing phone number. Overwrites every mutable column,
/// including the owning organization (reconciliation may reassign it).
pub async fn update_phone_number(pool: &SqlitePool, number: &PhoneNumber) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE phone_numbers
        SET organization_id = ?, remote_phone_number_id = ?, nickname = ?,
            inbound_bot_id = ?, outbound_bot_id = ?, assigned_user_id = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(&number.organization_id)
    .bind(&number.remote_phone_number_id)
    .bind(&number.nickname)
    .bind(&number.inbound_bot_id)
    .bind(&number.outbound_bot_id)
    .bind(&number.assigned_user_id)
    .bind(number.is_active)
    .bind(&number.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PhoneNumber",
            id: number.id.clone(),
        });
    }

    Ok(())
}

/// Assign or unassign the number's customer.
pub async fn assign_user(
    pool: &SqlitePool,
    organization_id: &str,
    id: &str,
    user_id: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE phone_numbers
        SET assigned_user_id = ?
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(user_id)
    .bind(organization_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PhoneNumber",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a phone number by ID within an organization.
pub async fn delete_phone_number(pool: &SqlitePool, organization_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM phone_numbers
        WHERE organization_id = ? AND id = ?
        "#,
    )
    .bind(organization_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PhoneNumber",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List phone numbers of an organization.
pub async fn list_phone_numbers(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Vec<PhoneNumber>> {
    let numbers = sqlx::query_as::<_, PhoneNumber>(
        r#"
        SELECT id, organization_id, number, remote_phone_number_id, nickname,
               inbound_bot_id, outbound_bot_id, assigned_user_id, is_active, created_at
        FROM phone_numbers
        WHERE organization_id = ?
        ORDER BY number
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_call_chain, test_db};

    fn sample(org_id: &str) -> PhoneNumber {
        PhoneNumber {
            id: "num-1".to_string(),
            organization_id: org_id.to_string(),
            number: "+15550001111".to_string(),
            remote_phone_number_id: Some("pn_abc".to_string()),
            nickname: None,
            inbound_bot_id: None,
            outbound_bot_id: None,
            assigned_user_id: None,
            is_active: true,
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_number_globally_unique() {
        let db = test_db().await;
        let (org_id, _, _, _) = seed_call_chain(&db).await;

        create_phone_number(db.pool(), &sample(&org_id)).await.unwrap();
        let dup = PhoneNumber {
            id: "num-2".to_string(),
            ..sample(&org_id)
        };
        let result = create_phone_number(db.pool(), &dup).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_bot_delete_clears_binding() {
        let db = test_db().await;
        let (org_id, _, bot_id, _) = seed_call_chain(&db).await;

        let mut number = sample(&org_id);
        number.inbound_bot_id = Some(bot_id.clone());
        create_phone_number(db.pool(), &number).await.unwrap();

        crate::bot::delete_bot(db.pool(), &org_id, &bot_id).await.unwrap();

        let fetched = get_phone_number(db.pool(), &org_id, "num-1").await.unwrap();
        assert_eq!(fetched.inbound_bot_id, None);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_assign_and_unassign_user() {
        let db = test_db().await;
        let (org_id, user_id, _, _) = seed_call_chain(&db).await;

        create_phone_number(db.pool(), &sample(&org_id)).await.unwrap();
        assign_user(db.pool(), &org_id, "num-1", Some(&user_id)).await.unwrap();
        let fetched = get_phone_number(db.pool(), &org_id, "num-1").await.unwrap();
        assert_eq!(fetched.assigned_user_id.as_deref(), Some(user_id.as_str()));

        assign_user(db.pool(), &org_id, "num-1", None).await.unwrap();
        let fetched = get_phone_number(db.pool(), &org_id, "num-1").await.unwrap();
        assert_eq!(fetched.assigned_user_id, None);
    }
}
