//! Hotel reservation operations.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{insert_error, Result};
use crate::models::Reservation;

/// Create a new reservation.
pub async fn create_reservation(
    conn: &mut SqliteConnection,
    reservation: &Reservation,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reservations (
            id, customer_id, call_id, room_type_id, guest_name, guest_phone,
            guest_email, check_in, check_out, number_of_guests,
            special_requests, status
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reservation.id)
    .bind(&reservation.customer_id)
    .bind(&reservation.call_id)
    .bind(&reservation.room_type_id)
    .bind(&reservation.guest_name)
    .bind(&reservation.guest_phone)
    .bind(&reservation.guest_email)
    .bind(&reservation.check_in)
    .bind(&reservation.check_out)
    .bind(reservation.number_of_guests)
    .bind(&reservation.special_requests)
    .bind(&reservation.status)
    .execute(&mut *conn)
    .await
    .map_err(|e| insert_error(e, "Reservation", &reservation.id))?;

    Ok(())
}

/// Whether a reservation derived from this call already exists.
pub async fn exists_for_call(conn: &mut SqliteConnection, call_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservations WHERE call_id = ?
        "#,
    )
    .bind(call_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

/// Count occupying reservations of a room type overlapping a stay.
///
/// Dates are `YYYY-MM-DD` and intervals half-open, so lexicographic
/// comparison is date comparison: an existing stay overlaps when it begins
/// before the requested checkout and ends after the requested check-in.
/// Only `CONFIRMED` and `CHECKED_IN` reservations occupy a room.
pub async fn count_overlapping(
    pool: &SqlitePool,
    room_type_id: &str,
    check_in: &str,
    check_out: &str,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE room_type_id = ?
          AND status IN ('CONFIRMED', 'CHECKED_IN')
          AND check_in < ?
          AND check_out > ?
        "#,
    )
    .bind(room_type_id)
    .bind(check_out)
    .bind(check_in)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List a customer's reservations, newest first.
pub async fn list_reservations(pool: &SqlitePool, customer_id: &str) -> Result<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, customer_id, call_id, room_type_id, guest_name, guest_phone,
               guest_email, check_in, check_out, number_of_guests,
               special_requests, status, created_at
        FROM reservations
        WHERE customer_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

/// List every reservation across an organization's customers, newest first.
pub async fn list_reservations_for_organization(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT r.id, r.customer_id, r.call_id, r.room_type_id, r.guest_name,
               r.guest_phone, r.guest_email, r.check_in, r.check_out,
               r.number_of_guests, r.special_requests, r.status, r.created_at
        FROM reservations r
        JOIN users u ON u.id = r.customer_id
        WHERE u.organization_id = ?
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomType, User};
    use crate::test_support::{seed_call_chain, test_db};
    use crate::{room, user};

    async fn seed_hotel(db: &crate::Database, org_id: &str) -> String {
        user::create_user(
            db.pool(),
            &User {
                id: "hotel-1".to_string(),
                organization_id: org_id.to_string(),
                email: "hotel@test.example".to_string(),
                name: "Seaside Hotel".to_string(),
                role: "CUSTOMER".to_string(),
                customer_type: Some("HOTEL".to_string()),
                created_at: String::new(),
            },
        )
        .await
        .unwrap();

        room::create_room_type(
            db.pool(),
            &RoomType {
                id: "room-std".to_string(),
                customer_id: "hotel-1".to_string(),
                name: "Standard".to_string(),
                description: None,
                total_rooms: 3,
                max_guests: 2,
                price_per_night: 120.0,
                is_active: true,
                created_at: String::new(),
            },
        )
        .await
        .unwrap();

        "hotel-1".to_string()
    }

    fn stay(id: &str, status: &str, check_in: &str, check_out: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            customer_id: "hotel-1".to_string(),
            call_id: None,
            room_type_id: Some("room-std".to_string()),
            guest_name: "Guest".to_string(),
            guest_phone: None,
            guest_email: None,
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            number_of_guests: 2,
            special_requests: None,
            status: status.to_string(),
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_overlap_is_half_open() {
        let db = test_db().await;
        let (org_id, _, _, _) = seed_call_chain(&db).await;
        seed_hotel(&db, &org_id).await;

        let mut conn = db.pool().acquire().await.unwrap();
        create_reservation(&mut conn, &stay("r1", "CONFIRMED", "2026-09-10", "2026-09-12"))
            .await
            .unwrap();

        // Same-day turnover: checkout day is free for the next check-in
        let count = count_overlapping(db.pool(), "room-std", "2026-09-12", "2026-09-14")
            .await
            .unwrap();
        assert_eq!(count, 0);

        // One shared night
        let count = count_overlapping(db.pool(), "room-std", "2026-09-11", "2026-09-14")
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_only_occupying_statuses_count() {
        let db = test_db().await;
        let (org_id, _, _, _) = seed_call_chain(&db).await;
        seed_hotel(&db, &org_id).await;

        let mut conn = db.pool().acquire().await.unwrap();
        create_reservation(&mut conn, &stay("r1", "PENDING", "2026-09-10", "2026-09-12"))
            .await
            .unwrap();
        create_reservation(&mut conn, &stay("r2", "CANCELLED", "2026-09-10", "2026-09-12"))
            .await
            .unwrap();
        create_reservation(&mut conn, &stay("r3", "CHECKED_IN", "2026-09-10", "2026-09-12"))
            .await
            .unwrap();

        let count = count_overlapping(db.pool(), "room-std", "2026-09-10", "2026-09-12")
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
