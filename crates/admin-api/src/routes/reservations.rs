//! Reservation listing.
//!
//! Reservations belong to hotel customers. Admins see every reservation
//! across the organization; a hotel customer sees their own; any other
//! customer type is refused.

use axum::extract::State;
use axum::Json;

use database::models::Reservation;
use database::reservation;

use crate::error::{ApiError, Result};
use crate::identity::Identity;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Reservation>>> {
    let pool = state.db.pool();

    let reservations = if identity.is_admin() {
        reservation::list_reservations_for_organization(pool, &identity.organization_id).await?
    } else {
        if identity.customer_type.as_deref() != Some("HOTEL") {
            return Err(ApiError::Forbidden(
                "Reservations are only available to hotel accounts".to_string(),
            ));
        }
        reservation::list_reservations(pool, &identity.user_id).await?
    };

    Ok(Json(reservations))
}
