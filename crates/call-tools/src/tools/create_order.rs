//! Order placement for restaurant customers.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use database::models::Order;
use database::{order, DatabaseError};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::confirmation_code;

/// Records a food order taken over the phone.
///
/// # Parameters
///
/// - `customer_name` (required)
/// - `items` (required): free-text item list as the agent captured it.
/// - `total_amount` (optional): order total.
/// - `customer_phone`, `delivery_address`, `notes` (optional)
///
/// One order per call: a repeat invocation for the same call reports the
/// duplicate instead of inserting a second row.
pub struct CreateOrder;

#[async_trait]
impl Tool for CreateOrder {
    fn name(&self) -> &str {
        "create_order"
    }

    fn description(&self) -> &str {
        "Places a food order with customer name, items, and optional \
         total, phone, delivery address, and notes."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let customer_name = args.get_string("customer_name")?;
        let items = args.get_string("items")?;
        let total_amount = args.get_number_opt("total_amount");
        let customer_phone = args.get_string_opt("customer_phone");
        let delivery_address = args.get_string_opt("delivery_address");
        let notes = args.get_string_opt("notes");

        let new_order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: args.context.customer_id.clone(),
            call_id: Some(args.context.call_id.clone()),
            customer_name,
            customer_phone,
            items,
            total_amount,
            delivery_address,
            notes,
            status: "PENDING".to_string(),
            created_at: String::new(),
        };

        let mut conn = args.context.pool.acquire().await?;
        match order::create_order(&mut conn, &new_order).await {
            Ok(()) => {
                info!("Order created from call: {}", new_order.id);
                Ok(ToolOutput::success(format!(
                    "Order placed successfully. Confirmation number: {}.",
                    confirmation_code(&new_order.id)
                )))
            }
            Err(DatabaseError::AlreadyExists { .. }) => Ok(ToolOutput::failure(
                "An order has already been placed for this call.",
            )),
            Err(e) => Err(e.into()),
        }
    }
}
