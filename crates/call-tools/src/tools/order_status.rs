//! Order status lookup for returning callers.

use async_trait::async_trait;

use database::order;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::confirmation_code;

/// Looks up an order by the confirmation number the agent read out.
///
/// Callers rarely have the full UUID, so the lookup also accepts the
/// short suffix form and always stays inside the current customer's
/// orders.
pub struct CheckOrderStatus;

#[async_trait]
impl Tool for CheckOrderStatus {
    fn name(&self) -> &str {
        "check_order_status"
    }

    fn description(&self) -> &str {
        "Looks up the status of an existing order by its confirmation number."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let order_id = args.get_string("order_id")?;

        let found =
            order::find_for_customer(&args.context.pool, &args.context.customer_id, &order_id)
                .await?;

        match found {
            Some(existing) => Ok(ToolOutput::success(format!(
                "Order {}: status {}. Items: {}.",
                confirmation_code(&existing.id),
                existing.status,
                existing.items
            ))),
            None => Ok(ToolOutput::failure("No order found with that reference.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::CallContext;
    use database::models::{Order, Organization, User};
    use database::{organization, user, Database};
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

        let restaurant = User {
            id: "user-1".to_string(),
            organization_id: "org-1".to_string(),
            email: "kitchen@example.com".to_string(),
            name: "Kitchen".to_string(),
            role: "CUSTOMER".to_string(),
            customer_type: Some("RESTAURANT".to_string()),
            created_at: String::new(),
        };
        user::create_user(db.pool(), &restaurant).await.unwrap();

        let other = User {
            id: "user-2".to_string(),
            organization_id: "org-1".to_string(),
            email: "other@example.com".to_string(),
            name: "Other".to_string(),
            role: "CUSTOMER".to_string(),
            customer_type: Some("RESTAURANT".to_string()),
            created_at: String::new(),
        };
        user::create_user(db.pool(), &other).await.unwrap();

        let context = CallContext {
            call_id: "call-1".to_string(),
            organization_id: "org-1".to_string(),
            customer_id: "user-1".to_string(),
            pool: db.pool().clone(),
        };
        (db, context)
    }

    async fn add_order(db: &Database, id: &str, customer_id: &str, status: &str) {
        let mut conn = db.pool().acquire().await.unwrap();
        let existing = Order {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            call_id: None,
            customer_name: "Maria".to_string(),
            customer_phone: None,
            items: "2x Margherita".to_string(),
            total_amount: Some(25.0),
            delivery_address: None,
            notes: None,
            status: status.to_string(),
            created_at: String::new(),
        };
        order::create_order(&mut conn, &existing).await.unwrap();
    }

    fn params(v: Value) -> HashMap<String, Value> {
        match v {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    #[tokio::test]
    async fn finds_order_by_short_suffix() {
        let (db, context) = seeded_context().await;
        add_order(&db, "aaaa1111-0000-0000-0000-00000000beef", "user-1", "PREPARING").await;

        let output = CheckOrderStatus
            .execute(ToolArgs::new(
                params(json!({"order_id": "beef"})),
                context,
            ))
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.content.contains("PREPARING"));
        assert!(output.content.contains("2x Margherita"));
    }

    #[tokio::test]
    async fn other_customers_orders_are_invisible() {
        let (db, context) = seeded_context().await;
        add_order(&db, "bbbb2222-0000-0000-0000-00000000cafe", "user-2", "PENDING").await;

        let output = CheckOrderStatus
            .execute(ToolArgs::new(
                params(json!({"order_id": "cafe"})),
                context,
            ))
            .await
            .unwrap();

        assert!(!output.success);
        assert!(output.content.contains("No order found"));
    }

    #[tokio::test]
    async fn missing_order_id_is_a_parameter_error() {
        let (_db, context) = seeded_context().await;

        let result = CheckOrderStatus
            .execute(ToolArgs::new(params(json!({})), context))
            .await;

        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }
}
