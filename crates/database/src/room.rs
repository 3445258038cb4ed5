//! Room inventory: room types and stop-sell dates.

use sqlx::SqlitePool;

use crate::error::{insert_error, DatabaseError, Result};
use crate::models::{RoomBlock, RoomType};

/// Create a new room type.
pub async fn create_room_type(pool: &SqlitePool, room_type: &RoomType) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO room_types (
            id, customer_id, name, description, total_rooms, max_guests,
            price_per_night, is_active
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&room_type.id)
    .bind(&room_type.customer_id)
    .bind(&room_type.name)
    .bind(&room_type.description)
    .bind(room_type.total_rooms)
    .bind(room_type.max_guests)
    .bind(room_type.price_per_night)
    .bind(room_type.is_active)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "RoomType", &room_type.id))?;

    Ok(())
}

/// Get a room type by ID for a customer.
pub async fn get_room_type(pool: &SqlitePool, customer_id: &str, id: &str) -> Result<RoomType> {
    sqlx::query_as::<_, RoomType>(
        r#"
        SELECT id, customer_id, name, description, total_rooms, max_guests,
               price_per_night, is_active, created_at
        FROM room_types
        WHERE customer_id = ? AND id = ?
        "#,
    )
    .bind(customer_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "RoomType",
        id: id.to_string(),
    })
}

/// List a customer's active room types, cheapest first.
pub async fn list_active_room_types(
    pool: &SqlitePool,
    customer_id: &str,
) -> Result<Vec<RoomType>> {
    let room_types = sqlx::query_as::<_, RoomType>(
        r#"
        SELECT id, customer_id, name, description, total_rooms, max_guests,
               price_per_night, is_active, created_at
        FROM room_types
        WHERE customer_id = ? AND is_active = 1
        ORDER BY price_per_night
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(room_types)
}

/// Block a date for a room type.
pub async fn create_room_block(pool: &SqlitePool, block: &RoomBlock) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO room_blocks (id, room_type_id, date, reason)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&block.id)
    .bind(&block.room_type_id)
    .bind(&block.date)
    .bind(&block.reason)
    .execute(pool)
    .await
    .map_err(|e| insert_error(e, "RoomBlock", &block.date))?;

    Ok(())
}

/// Count blocked dates of a room type inside a half-open stay interval.
pub async fn count_blocked_dates(
    pool: &SqlitePool,
    room_type_id: &str,
    check_in: &str,
    check_out: &str,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM room_blocks
        WHERE room_type_id = ? AND date >= ? AND date < ?
        "#,
    )
    .bind(room_type_id)
    .bind(check_in)
    .bind(check_out)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
