//! Room availability check for hotel customers.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::debug;

use database::models::RoomType;
use database::{reservation, room};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Checks whether rooms are free for a stay, and proposes nearby
/// alternative dates when they are not.
///
/// # Parameters
///
/// - `checkIn` (required): `YYYY-MM-DD`.
/// - `checkOut` (required): `YYYY-MM-DD`, after `checkIn`. The checkout
///   day itself is not occupied.
/// - `guests` (optional): party size, default 1.
/// - `roomType` (optional): room type name preference, matched
///   case-insensitively as a substring.
pub struct CheckAvailability;

#[async_trait]
impl Tool for CheckAvailability {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn description(&self) -> &str {
        "Checks room availability for a date range and party size, \
         suggesting alternative dates when the requested stay is full."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let check_in = args.get_date("checkIn")?;
        let check_out = args.get_date("checkOut")?;
        let guests = args.get_i64_or("guests", 1);
        let wanted_type = args.get_string_opt("roomType");

        if check_out <= check_in {
            return Ok(ToolOutput::failure(
                "Check-out must be after check-in.",
            ));
        }

        let pool = &args.context.pool;
        let candidates: Vec<RoomType> =
            room::list_active_room_types(pool, &args.context.customer_id)
                .await?
                .into_iter()
                .filter(|rt| rt.max_guests >= guests)
                .filter(|rt| match &wanted_type {
                    Some(wanted) => rt.name.to_lowercase().contains(&wanted.to_lowercase()),
                    None => true,
                })
                .collect();

        if candidates.is_empty() {
            return Ok(ToolOutput::success(
                json!({
                    "available": false,
                    "message": "No room type matches that party size or preference.",
                })
                .to_string(),
            ));
        }

        let open = open_rooms(pool, &candidates, check_in, check_out).await?;
        if !open.is_empty() {
            let lowest = lowest_price(&open);
            return Ok(ToolOutput::success(
                json!({
                    "available": true,
                    "rooms": open,
                    "lowestPrice": lowest,
                    "message": format!(
                        "{} room type(s) available from {} to {}, starting at {} per night.",
                        open.len(), check_in, check_out, lowest
                    ),
                })
                .to_string(),
            ));
        }

        debug!(
            "No availability {} to {}, probing alternative dates",
            check_in, check_out
        );
        let alternatives = probe_alternatives(pool, &candidates, check_in, check_out).await?;
        if alternatives.is_empty() {
            return Ok(ToolOutput::success(
                json!({
                    "available": false,
                    "message": format!(
                        "No rooms available from {} to {}, and no openings on nearby dates.",
                        check_in, check_out
                    ),
                })
                .to_string(),
            ));
        }

        Ok(ToolOutput::success(
            json!({
                "available": false,
                "alternatives": alternatives,
                "message": format!(
                    "No rooms available from {} to {}, but nearby dates have openings.",
                    check_in, check_out
                ),
            })
            .to_string(),
        ))
    }
}

/// Room types with at least one free room for the stay, as JSON entries.
/// A type is closed out when any night of the stay is blocked.
async fn open_rooms(
    pool: &SqlitePool,
    types: &[RoomType],
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<Value>, ToolError> {
    let check_in = check_in.to_string();
    let check_out = check_out.to_string();

    let mut rooms = Vec::new();
    for rt in types {
        if room::count_blocked_dates(pool, &rt.id, &check_in, &check_out).await? > 0 {
            continue;
        }
        let booked = reservation::count_overlapping(pool, &rt.id, &check_in, &check_out).await?;
        let remaining = rt.total_rooms - booked;
        if remaining > 0 {
            rooms.push(json!({
                "name": rt.name,
                "price": rt.price_per_night,
                "availableCount": remaining,
                "description": rt.description,
            }));
        }
    }
    Ok(rooms)
}

/// Probe shifted stays of the same length, up to three days either side of
/// the requested check-in. Past check-ins are skipped. Returns at most
/// three alternatives.
async fn probe_alternatives(
    pool: &SqlitePool,
    types: &[RoomType],
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<Value>, ToolError> {
    let nights = (check_out - check_in).num_days();
    let today = Utc::now().date_naive();

    let mut alternatives = Vec::new();
    for offset in -3i64..=3 {
        if offset == 0 {
            continue;
        }
        let alt_in = check_in + Duration::days(offset);
        if alt_in < today {
            continue;
        }
        let alt_out = alt_in + Duration::days(nights);

        let rooms = open_rooms(pool, types, alt_in, alt_out).await?;
        if !rooms.is_empty() {
            alternatives.push(json!({
                "checkIn": alt_in.to_string(),
                "checkOut": alt_out.to_string(),
                "rooms": rooms,
            }));
            if alternatives.len() == 3 {
                break;
            }
        }
    }
    Ok(alternatives)
}

fn lowest_price(rooms: &[Value]) -> f64 {
    rooms
        .iter()
        .filter_map(|r| r["price"].as_f64())
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::CallContext;
    use database::models::{Bot, Call, Organization, Reservation, RoomBlock, User};
    use database::{bot, call, organization, user, Database};
    use serde_json::json;
    use std::collections::HashMap;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_hotel(db: &Database) -> CallContext {
        let org = Organization {
            id: "org-1".to_string(),
            name: "Demo".to_string(),
            slug: "demo".to_string(),
            api_key: None,
            webhook_secret: None,
            monthly_call_minutes: 0,
            created_at: String::new(),
        };
        organization::create_organization(db.pool(), &org).await.unwrap();

        let hotel = User {
            id: "user-1".to_string(),
            organization_id: "org-1".to_string(),
            email: "hotel@example.com".to_string(),
            name: "Hotel".to_string(),
            role: "CUSTOMER".to_string(),
            customer_type: Some("HOTEL".to_string()),
            created_at: String::new(),
        };
        user::create_user(db.pool(), &hotel).await.unwrap();

        let agent = Bot {
            id: "bot-1".to_string(),
            organization_id: "org-1".to_string(),
            created_by: "user-1".to_string(),
            name: "Front Desk".to_string(),
            description: None,
            remote_agent_id: "agent_abc".to_string(),
            remote_llm_id: None,
            voice_id: "11labs-Adrian".to_string(),
            model: "gpt-4.1".to_string(),
            general_prompt: "You are a helpful AI assistant.".to_string(),
            begin_message: None,
            webhook_url: None,
            language: "en-US".to_string(),
            custom_tools: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        };
        bot::create_bot(db.pool(), &agent).await.unwrap();

        let the_call = Call {
            id: "call-1".to_string(),
            organization_id: "org-1".to_string(),
            bot_id: "bot-1".to_string(),
            initiated_by: "user-1".to_string(),
            remote_call_id: "rc_001".to_string(),
            from_number: None,
            to_number: None,
            direction: "INBOUND".to_string(),
            status: "IN_PROGRESS".to_string(),
            started_at_ms: None,
            ended_at_ms: None,
            duration_ms: None,
            transcript: None,
            recording_url: None,
            public_log_url: None,
            disconnection_reason: None,
            llm_token_usage: None,
            call_cost_cents: None,
            created_at: String::new(),
        };
        call::create_call(db.pool(), &the_call).await.unwrap();

        CallContext {
            call_id: "call-1".to_string(),
            organization_id: "org-1".to_string(),
            customer_id: "user-1".to_string(),
            pool: db.pool().clone(),
        }
    }

    async fn add_room_type(db: &Database, id: &str, name: &str, total: i64, max_guests: i64, price: f64) {
        let rt = database::models::RoomType {
            id: id.to_string(),
            customer_id: "user-1".to_string(),
            name: name.to_string(),
            description: None,
            total_rooms: total,
            max_guests,
            price_per_night: price,
            is_active: true,
            created_at: String::new(),
        };
        room::create_room_type(db.pool(), &rt).await.unwrap();
    }

    async fn add_reservation(db: &Database, room_type_id: &str, check_in: &str, check_out: &str, status: &str) {
        let mut conn = db.pool().acquire().await.unwrap();
        let r = Reservation {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: "user-1".to_string(),
            call_id: None,
            room_type_id: Some(room_type_id.to_string()),
            guest_name: "Guest".to_string(),
            guest_phone: None,
            guest_email: None,
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            number_of_guests: 2,
            special_requests: None,
            status: status.to_string(),
            created_at: String::new(),
        };
        reservation::create_reservation(&mut conn, &r).await.unwrap();
    }

    fn params(v: Value) -> HashMap<String, Value> {
        match v {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    fn decoded(output: &ToolOutput) -> Value {
        serde_json::from_str(&output.content).unwrap()
    }

    #[tokio::test]
    async fn reports_open_rooms_with_lowest_price() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 2, 2, 120.0).await;
        add_room_type(&db, "rt-2", "Deluxe King", 1, 3, 180.0).await;

        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03", "guests": 2})),
                context,
            ))
            .await
            .unwrap();

        assert!(output.success);
        let body = decoded(&output);
        assert_eq!(body["available"], json!(true));
        assert_eq!(body["rooms"].as_array().unwrap().len(), 2);
        assert_eq!(body["lowestPrice"], json!(120.0));
    }

    #[tokio::test]
    async fn full_room_type_is_excluded_and_checkout_day_frees_the_room() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 1, 2, 120.0).await;
        add_reservation(&db, "rt-1", "2027-06-01", "2027-06-03", "CONFIRMED").await;

        // Overlapping stay: the single room is taken.
        let taken = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-02", "checkOut": "2027-06-04"})),
                context.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(decoded(&taken)["available"], json!(false));

        // Same-day turnover: check-in on the existing checkout day is fine.
        let turnover = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-03", "checkOut": "2027-06-05"})),
                context,
            ))
            .await
            .unwrap();
        assert_eq!(decoded(&turnover)["available"], json!(true));
    }

    #[tokio::test]
    async fn capacity_subtracts_overlapping_confirmed_reservations() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 3, 2, 120.0).await;
        add_reservation(&db, "rt-1", "2027-06-01", "2027-06-03", "CONFIRMED").await;
        add_reservation(&db, "rt-1", "2027-06-01", "2027-06-03", "CONFIRMED").await;

        // 3 rooms, 2 booked: one left.
        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03"})),
                context.clone(),
            ))
            .await
            .unwrap();
        let body = decoded(&output);
        assert_eq!(body["available"], json!(true));
        assert_eq!(body["rooms"][0]["availableCount"], json!(1));

        // Third overlapping booking fills the type.
        add_reservation(&db, "rt-1", "2027-06-02", "2027-06-04", "CONFIRMED").await;
        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03"})),
                context,
            ))
            .await
            .unwrap();
        assert_eq!(decoded(&output)["available"], json!(false));
    }

    #[tokio::test]
    async fn fully_booked_type_is_omitted_from_open_listing() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 1, 2, 120.0).await;
        add_room_type(&db, "rt-2", "Deluxe King", 1, 3, 180.0).await;
        add_reservation(&db, "rt-1", "2027-06-01", "2027-06-03", "CONFIRMED").await;

        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03", "guests": 2})),
                context,
            ))
            .await
            .unwrap();

        let body = decoded(&output);
        assert_eq!(body["available"], json!(true));
        let rooms = body["rooms"].as_array().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0]["name"], json!("Deluxe King"));
        assert_eq!(rooms[0]["availableCount"], json!(1));
    }

    #[tokio::test]
    async fn blocked_night_closes_the_room_type() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 3, 2, 120.0).await;
        let block = RoomBlock {
            id: "blk-1".to_string(),
            room_type_id: "rt-1".to_string(),
            date: "2027-06-02".to_string(),
            reason: Some("maintenance".to_string()),
        };
        room::create_room_block(db.pool(), &block).await.unwrap();

        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03"})),
                context,
            ))
            .await
            .unwrap();

        assert_eq!(decoded(&output)["available"], json!(false));
    }

    #[tokio::test]
    async fn proposes_alternative_dates_when_full() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Standard Queen", 1, 2, 120.0).await;
        // Book out the requested window only; shifted stays are open.
        add_reservation(&db, "rt-1", "2027-06-01", "2027-06-03", "CONFIRMED").await;

        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-03"})),
                context,
            ))
            .await
            .unwrap();

        let body = decoded(&output);
        assert_eq!(body["available"], json!(false));
        let alternatives = body["alternatives"].as_array().unwrap();
        assert!(!alternatives.is_empty());
        assert!(alternatives.len() <= 3);
        // Two-night stay preserved in the proposals.
        assert_eq!(alternatives[0]["checkIn"], json!("2027-05-29"));
        assert_eq!(alternatives[0]["checkOut"], json!("2027-05-31"));
    }

    #[tokio::test]
    async fn guest_count_filters_undersized_rooms() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;
        add_room_type(&db, "rt-1", "Single", 5, 1, 80.0).await;

        let output = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-01", "checkOut": "2027-06-02", "guests": 4})),
                context,
            ))
            .await
            .unwrap();

        let body = decoded(&output);
        assert_eq!(body["available"], json!(false));
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("party size"));
    }

    #[tokio::test]
    async fn invalid_dates_are_rejected() {
        let db = test_db().await;
        let context = seed_hotel(&db).await;

        let bad = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "June 1st", "checkOut": "2027-06-03"})),
                context.clone(),
            ))
            .await;
        assert!(matches!(bad, Err(ToolError::InvalidParameter { .. })));

        let inverted = CheckAvailability
            .execute(ToolArgs::new(
                params(json!({"checkIn": "2027-06-03", "checkOut": "2027-06-01"})),
                context,
            ))
            .await
            .unwrap();
        assert!(!inverted.success);
    }
}
