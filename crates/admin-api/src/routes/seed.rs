//! Demo data seeding.
//!
//! One-shot bootstrap for a fresh install: a demo organization with an
//! admin, a restaurant customer, a hotel customer, a demo number, and two
//! hotel room types. Rerunning is a no-op once the admin user exists.
//! Users carry no credentials; authentication lives in the fronting layer.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use database::models::{Organization, PhoneNumber, RoomType, User};
use database::{organization, phone_number, room, user, DatabaseError};

use crate::error::Result;
use crate::state::AppState;

const ADMIN_EMAIL: &str = "admin@demo.example";

pub async fn seed(State(state): State<AppState>) -> Result<Json<Value>> {
    let pool = state.db.pool();

    match user::get_user_by_email(pool, ADMIN_EMAIL).await {
        Ok(_) => {
            return Ok(Json(json!({
                "seeded": false,
                "message": "demo data already present",
            })));
        }
        Err(DatabaseError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let org = Organization {
        id: Uuid::new_v4().to_string(),
        name: "Demo Org".to_string(),
        slug: "demo-org".to_string(),
        api_key: None,
        webhook_secret: None,
        monthly_call_minutes: 0,
        created_at: String::new(),
    };
    organization::create_organization(pool, &org).await?;

    let admin = User {
        id: Uuid::new_v4().to_string(),
        organization_id: org.id.clone(),
        email: ADMIN_EMAIL.to_string(),
        name: "Demo Admin".to_string(),
        role: "ADMIN".to_string(),
        customer_type: None,
        created_at: String::new(),
    };
    user::create_user(pool, &admin).await?;

    let restaurant = User {
        id: Uuid::new_v4().to_string(),
        organization_id: org.id.clone(),
        email: "restaurant@demo.example".to_string(),
        name: "Pizza Palace".to_string(),
        role: "CUSTOMER".to_string(),
        customer_type: Some("RESTAURANT".to_string()),
        created_at: String::new(),
    };
    user::create_user(pool, &restaurant).await?;

    let hotel = User {
        id: Uuid::new_v4().to_string(),
        organization_id: org.id.clone(),
        email: "hotel@demo.example".to_string(),
        name: "Grand Plaza Hotel".to_string(),
        role: "CUSTOMER".to_string(),
        customer_type: Some("HOTEL".to_string()),
        created_at: String::new(),
    };
    user::create_user(pool, &hotel).await?;

    let number = PhoneNumber {
        id: Uuid::new_v4().to_string(),
        organization_id: org.id.clone(),
        number: "+15550100000".to_string(),
        remote_phone_number_id: None,
        nickname: Some("Demo line".to_string()),
        inbound_bot_id: None,
        outbound_bot_id: None,
        assigned_user_id: Some(restaurant.id.clone()),
        is_active: true,
        created_at: String::new(),
    };
    phone_number::create_phone_number(pool, &number).await?;

    let room_types = [
        RoomType {
            id: Uuid::new_v4().to_string(),
            customer_id: hotel.id.clone(),
            name: "Standard Queen".to_string(),
            description: Some("Queen bed, city view".to_string()),
            total_rooms: 10,
            max_guests: 2,
            price_per_night: 129.0,
            is_active: true,
            created_at: String::new(),
        },
        RoomType {
            id: Uuid::new_v4().to_string(),
            customer_id: hotel.id.clone(),
            name: "Deluxe King".to_string(),
            description: Some("King bed, balcony".to_string()),
            total_rooms: 4,
            max_guests: 3,
            price_per_night: 219.0,
            is_active: true,
            created_at: String::new(),
        },
    ];
    for room_type in &room_types {
        room::create_room_type(pool, room_type).await?;
    }

    info!("Seeded demo organization {} ({})", org.slug, org.id);

    Ok(Json(json!({
        "seeded": true,
        "organization_id": org.id,
        "admin_user_id": admin.id,
        "customer_ids": [restaurant.id, hotel.id],
    })))
}
