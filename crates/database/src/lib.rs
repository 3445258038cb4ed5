//! SQLite persistence layer for Voicedesk.
//!
//! This crate provides async database operations for organizations, users,
//! bots, phone numbers, calls, and the business records derived from calls,
//! using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{models::Organization, organization, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:voicedesk.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let org = Organization {
//!         id: "7cc254f1-9a17-4f17-bfcb-a9a9f04dd2e3".to_string(),
//!         name: "Demo Org".to_string(),
//!         slug: "demo-org".to_string(),
//!         api_key: None,
//!         webhook_secret: None,
//!         monthly_call_minutes: 0,
//!         created_at: String::new(),
//!     };
//!     organization::create_organization(db.pool(), &org).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod call;
pub mod call_analytics;
pub mod error;
pub mod knowledge_base;
pub mod models;
pub mod order;
pub mod organization;
pub mod phone_number;
pub mod reservation;
pub mod room;
pub mod user;
pub mod webhook_log;

pub use error::{DatabaseError, Result};
pub use models::{
    Bot, BotKnowledgeBase, Call, CallAnalytics, KnowledgeBase, Order, Organization, PhoneNumber,
    Reservation, RoomBlock, RoomType, User, WebhookLog,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent webhook deliveries alongside
    /// admin traffic.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/voicedesk.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub mod test_support {
    //! Shared fixtures for crate-level tests.

    use super::*;
    use crate::models::{Bot, Call, Organization, User};

    pub async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    /// Insert an organization, an admin user, a bot, and a PENDING call,
    /// returning their ids as (org, user, bot, call).
    pub async fn seed_call_chain(db: &Database) -> (String, String, String, String) {
        let org = Organization {
            id: "org-1".to_string(),
            name: "Test Org".to_string(),
            slug: "test-org".to_string(),
            api_key: None,
            webhook_secret: None,
            monthly_call_minutes: 0,
            created_at: String::new(),
        };
        organization::create_organization(db.pool(), &org).await.unwrap();

        let admin = User {
            id: "user-1".to_string(),
            organization_id: org.id.clone(),
            email: "admin@test.example".to_string(),
            name: "Admin".to_string(),
            role: "ADMIN".to_string(),
            customer_type: None,
            created_at: String::new(),
        };
        user::create_user(db.pool(), &admin).await.unwrap();

        let test_bot = Bot {
            id: "bot-1".to_string(),
            organization_id: org.id.clone(),
            created_by: admin.id.clone(),
            name: "Front Desk".to_string(),
            description: None,
            remote_agent_id: "agent_abc123".to_string(),
            remote_llm_id: Some("llm_abc123".to_string()),
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
        bot::create_bot(db.pool(), &test_bot).await.unwrap();

        let test_call = Call {
            id: "call-1".to_string(),
            organization_id: org.id.clone(),
            bot_id: test_bot.id.clone(),
            initiated_by: admin.id.clone(),
            remote_call_id: "rc_001".to_string(),
            from_number: Some("+15550001111".to_string()),
            to_number: Some("+15550002222".to_string()),
            direction: "INBOUND".to_string(),
            status: "PENDING".to_string(),
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
        call::create_call(db.pool(), &test_call).await.unwrap();

        (org.id, admin.id, test_bot.id, test_call.id)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::User;

    #[tokio::test]
    async fn test_migrations_apply_cleanly() {
        let db = test_db().await;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;
        let (org_id, _, _, _) = seed_call_chain(&db).await;

        let customer = User {
            id: "user-2".to_string(),
            organization_id: org_id.clone(),
            email: "pizza@test.example".to_string(),
            name: "Pizza Palace".to_string(),
            role: "CUSTOMER".to_string(),
            customer_type: Some("RESTAURANT".to_string()),
            created_at: String::new(),
        };
        user::create_user(db.pool(), &customer).await.unwrap();

        let fetched = user::get_user(db.pool(), &customer.id).await.unwrap();
        assert_eq!(fetched.customer_type.as_deref(), Some("RESTAURANT"));

        let by_email = user::get_user_by_email(db.pool(), "pizza@test.example")
            .await
            .unwrap();
        assert_eq!(by_email.id, customer.id);

        let users = user::list_users(db.pool(), &org_id).await.unwrap();
        assert_eq!(users.len(), 2);

        // Duplicate email maps to AlreadyExists
        let dup = User {
            id: "user-3".to_string(),
            ..customer.clone()
        };
        let result = user::create_user(db.pool(), &dup).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_cascade_bot_delete_removes_calls() {
        let db = test_db().await;
        let (org_id, _, bot_id, call_id) = seed_call_chain(&db).await;

        bot::delete_bot(db.pool(), &org_id, &bot_id).await.unwrap();

        let result = call::get_call(db.pool(), &org_id, &call_id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
