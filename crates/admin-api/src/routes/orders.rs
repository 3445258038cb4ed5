//! Order listing.
//!
//! Customers see their own orders (optionally filtered by status);
//! admins see every order across the organization's customers.

use axum::extract::{Query, State};
use axum::Json;

use database::models::Order;
use database::order;

use crate::error::Result;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let pool = state.db.pool();

    let orders = if identity.is_admin() {
        order::list_orders_for_organization(pool, &identity.organization_id).await?
    } else {
        order::list_orders(pool, &identity.user_id, query.status.as_deref()).await?
    };

    Ok(Json(orders))
}
