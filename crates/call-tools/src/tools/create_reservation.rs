//! Reservation booking for hotel customers.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use database::models::Reservation;
use database::{reservation, room, DatabaseError};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::confirmation_code;

/// Books a room for a caller.
///
/// # Parameters
///
/// - `guest_name` (required)
/// - `check_in`, `check_out` (required): `YYYY-MM-DD`, checkout after
///   check-in.
/// - `number_of_guests` (optional): default 1.
/// - `room_type` (optional): room type name, matched case-insensitively
///   against the hotel's active types. An unrecognized name leaves the
///   reservation unassigned rather than failing the booking.
/// - `guest_phone`, `guest_email`, `special_requests` (optional)
///
/// One reservation per call, same as orders.
pub struct CreateReservation;

#[async_trait]
impl Tool for CreateReservation {
    fn name(&self) -> &str {
        "create_reservation"
    }

    fn description(&self) -> &str {
        "Books a room reservation with guest name, stay dates, and \
         optional party size, room type, and contact details."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let guest_name = args.get_string("guest_name")?;
        let check_in = args.get_date("check_in")?;
        let check_out = args.get_date("check_out")?;
        let number_of_guests = args.get_i64_or("number_of_guests", 1);
        let wanted_type = args.get_string_opt("room_type");
        let guest_phone = args.get_string_opt("guest_phone");
        let guest_email = args.get_string_opt("guest_email");
        let special_requests = args.get_string_opt("special_requests");

        if check_out <= check_in {
            return Ok(ToolOutput::failure(
                "Check-out must be after check-in.",
            ));
        }

        let room_type_id = match &wanted_type {
            Some(wanted) => {
                room::list_active_room_types(&args.context.pool, &args.context.customer_id)
                    .await?
                    .into_iter()
                    .find(|rt| rt.name.eq_ignore_ascii_case(wanted))
                    .map(|rt| rt.id)
            }
            None => None,
        };

        let new_reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            customer_id: args.context.customer_id.clone(),
            call_id: Some(args.context.call_id.clone()),
            room_type_id,
            guest_name,
            guest_phone,
            guest_email,
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            number_of_guests,
            special_requests,
            status: "PENDING".to_string(),
            created_at: String::new(),
        };

        let mut conn = args.context.pool.acquire().await?;
        match reservation::create_reservation(&mut conn, &new_reservation).await {
            Ok(()) => {
                info!("Reservation created from call: {}", new_reservation.id);
                Ok(ToolOutput::success(format!(
                    "Reservation created from {} to {}. Confirmation number: {}.",
                    new_reservation.check_in,
                    new_reservation.check_out,
                    confirmation_code(&new_reservation.id)
                )))
            }
            Err(DatabaseError::AlreadyExists { .. }) => Ok(ToolOutput::failure(
                "A reservation has already been made for this call.",
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::CallContext;
    use database::models::{Bot, Call, Organization, RoomType, User};
    use database::{bot, call, organization, user, Database};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn seeded_context() -> (Database, CallContext) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

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
            from_number: Some("+15550001111".to_string()),
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

        let rt = RoomType {
            id: "rt-1".to_string(),
            customer_id: "user-1".to_string(),
            name: "Deluxe King".to_string(),
            description: None,
            total_rooms: 3,
            max_guests: 3,
            price_per_night: 180.0,
            is_active: true,
            created_at: String::new(),
        };
        room::create_room_type(db.pool(), &rt).await.unwrap();

        let context = CallContext {
            call_id: "call-1".to_string(),
            organization_id: "org-1".to_string(),
            customer_id: "user-1".to_string(),
            pool: db.pool().clone(),
        };
        (db, context)
    }

    fn params(v: Value) -> HashMap<String, Value> {
        match v {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    #[tokio::test]
    async fn books_a_room_and_resolves_the_type_case_insensitively() {
        let (db, context) = seeded_context().await;

        let output = CreateReservation
            .execute(ToolArgs::new(
                params(json!({
                    "guest_name": "John Smith",
                    "check_in": "2027-06-01",
                    "check_out": "2027-06-03",
                    "number_of_guests": 2,
                    "room_type": "deluxe king",
                })),
                context,
            ))
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.content.contains("2027-06-01"));

        let reservations = database::reservation::list_reservations(db.pool(), "user-1")
            .await
            .unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].room_type_id.as_deref(), Some("rt-1"));
        assert_eq!(reservations[0].number_of_guests, 2);
        assert_eq!(reservations[0].status, "PENDING");
    }

    #[tokio::test]
    async fn unknown_room_type_books_unassigned() {
        let (db, context) = seeded_context().await;

        let output = CreateReservation
            .execute(ToolArgs::new(
                params(json!({
                    "guest_name": "John Smith",
                    "check_in": "2027-06-01",
                    "check_out": "2027-06-02",
                    "room_type": "Penthouse",
                })),
                context,
            ))
            .await
            .unwrap();

        assert!(output.success);
        let reservations = database::reservation::list_reservations(db.pool(), "user-1")
            .await
            .unwrap();
        assert_eq!(reservations[0].room_type_id, None);
    }

    #[tokio::test]
    async fn second_reservation_on_same_call_is_reported() {
        let (db, context) = seeded_context().await;
        let p = params(json!({
            "guest_name": "John Smith",
            "check_in": "2027-06-01",
            "check_out": "2027-06-02",
        }));

        let first = CreateReservation
            .execute(ToolArgs::new(p.clone(), context.clone()))
            .await
            .unwrap();
        assert!(first.success);

        let second = CreateReservation
            .execute(ToolArgs::new(p, context))
            .await
            .unwrap();
        assert!(!second.success);
        assert!(second.content.contains("already been made"));

        let reservations = database::reservation::list_reservations(db.pool(), "user-1")
            .await
            .unwrap();
        assert_eq!(reservations.len(), 1);
    }

    #[tokio::test]
    async fn inverted_dates_are_rejected_softly() {
        let (_db, context) = seeded_context().await;

        let output = CreateReservation
            .execute(ToolArgs::new(
                params(json!({
                    "guest_name": "John Smith",
                    "check_in": "2027-06-03",
                    "check_out": "2027-06-01",
                })),
                context,
            ))
            .await
            .unwrap();

        assert!(!output.success);
        assert!(output.content.contains("after check-in"));
    }
}
