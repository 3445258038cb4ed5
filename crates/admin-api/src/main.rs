//! HTTP server for the Voicedesk admin backend.
//!
//! Serves the voice platform's webhooks (call lifecycle and mid-call tool
//! invocations) and the admin/customer JSON API for bots, phone numbers,
//! knowledge bases, calls, orders, and reservations.

mod config;
mod credentials;
mod error;
mod identity;
mod routes;
mod state;

use database::Database;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting admin API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build application state and router
    let addr = config.addr;
    let state = AppState::new(db, config);
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %addr, "Admin API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
