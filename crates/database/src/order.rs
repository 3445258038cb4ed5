//! Restaurant order operations.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{insert_error, Result};
use crate::models::Order;

/// Create a new order.
///
/// Takes a connection: webhook analysis derives orders inside its
/// transaction, tools acquire a connection from the pool.
pub async fn create_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, customer_id, call_id, customer_name, customer_phone, items,
            total_amount, delivery_address, notes, status
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(&order.call_id)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.items)
    .bind(order.total_amount)
    .bind(&order.delivery_address)
    .bind(&order.notes)
    .bind(&order.status)
    .execute(&mut *conn)
    .await
    .map_err(|e| insert_error(e, "Order", &order.id))?;

    Ok(())
}

/// Whether an order derived from this call already exists.
pub async fn exists_for_call(conn: &mut SqliteConnection, call_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders WHERE call_id = ?
        "#,
    )
    .bind(call_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

/// Find an order by exact id or id suffix, always scoped to the customer.
///
/// Callers quote the short id the agent read out; the customer filter keeps
/// suffix guessing from reaching another tenant's orders.
pub async fn find_for_customer(
    pool: &SqlitePool,
    customer_id: &str,
    id_or_suffix: &str,
) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, customer_id, call_id, customer_name, customer_phone, items,
               total_amount, delivery_address, notes, status, created_at
        FROM orders
        WHERE customer_id = ? AND (id = ? OR id LIKE '%' || ?)
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(customer_id)
    .bind(id_or_suffix)
    .bind(id_or_suffix)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

/// List a customer's orders, newest first, optionally filtered by status.
pub async fn list_orders(
    pool: &SqlitePool,
    customer_id: &str,
    status: Option<&str>,
) -> Result<Vec<Order>> {
    let orders = match status {
        Some(status) => {
            sqlx::query_as::<_, Order>(
                r#"
                SELECT id, customer_id, call_id, customer_name, customer_phone, items,
                       total_amount, delivery_address, notes, status, created_at
                FROM orders
                WHERE customer_id = ? AND status = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(customer_id)
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Order>(
                r#"
                SELECT id, customer_id, call_id, customer_name, customer_phone, items,
                       total_amount, delivery_address, notes, status, created_at
                FROM orders
                WHERE customer_id = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(customer_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(orders)
}

/// List every order across an organization's customers, newest first.
pub async fn list_orders_for_organization(
    pool: &SqlitePool,
    organization_id: &str,
) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT o.id, o.customer_id, o.call_id, o.customer_name, o.customer_phone,
               o.items, o.total_amount, o.delivery_address, o.notes, o.status,
               o.created_at
        FROM orders o
        JOIN users u ON u.id = o.customer_id
        WHERE u.organization_id = ?
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::test_support::{seed_call_chain, test_db};
    use crate::user;

    async fn seed_customer(db: &crate::Database, org_id: &str, id: &str, email: &str) {
        user::create_user(
            db.pool(),
            &User {
                id: id.to_string(),
                organization_id: org_id.to_string(),
                email: email.to_string(),
                name: "Restaurant".to_string(),
                role: "CUSTOMER".to_string(),
                customer_type: Some("RESTAURANT".to_string()),
                created_at: String::new(),
            },
        )
        .await
        .unwrap();
    }

    fn sample(id: &str, customer_id: &str) -> Order {
        Order {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            call_id: None,
            customer_name: "Dana".to_string(),
            customer_phone: None,
            items: "2x Margherita".to_string(),
            total_amount: Some(24.5),
            delivery_address: None,
            notes: None,
            status: "PENDING".to_string(),
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_suffix_lookup_stays_in_customer_scope() {
        let db = test_db().await;
        let (org_id, _, _, _) = seed_call_chain(&db).await;
        seed_customer(&db, &org_id, "cust-a", "a@test.example").await;
        seed_customer(&db, &org_id, "cust-b", "b@test.example").await;

        let mut conn = db.pool().acquire().await.unwrap();
        create_order(&mut conn, &sample("order-11112222", "cust-a")).await.unwrap();
        create_order(&mut conn, &sample("order-33332222", "cust-b")).await.unwrap();

        // The shared suffix resolves within each customer's own scope
        let found = find_for_customer(db.pool(), "cust-a", "2222").await.unwrap().unwrap();
        assert_eq!(found.id, "order-11112222");

        let found = find_for_customer(db.pool(), "cust-b", "2222").await.unwrap().unwrap();
        assert_eq!(found.id, "order-33332222");

        // A suffix that only exists for the other customer resolves to nothing
        let missed = find_for_customer(db.pool(), "cust-a", "33332222").await.unwrap();
        assert!(missed.is_none());
    }

    #[tokio::test]
    async fn test_one_order_per_call() {
        let db = test_db().await;
        let (org_id, _, _, call_id) = seed_call_chain(&db).await;
        seed_customer(&db, &org_id, "cust-a", "a@test.example").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let mut order = sample("order-1", "cust-a");
        order.call_id = Some(call_id.clone());
        create_order(&mut conn, &order).await.unwrap();
        assert!(exists_for_call(&mut conn, &call_id).await.unwrap());

        let mut dup = sample("order-2", "cust-a");
        dup.call_id = Some(call_id);
        let result = create_order(&mut conn, &dup).await;
        assert!(result.is_err());
    }
}
