//! Route handlers for the admin API.

pub mod bots;
pub mod calls;
pub mod debug;
pub mod health;
pub mod knowledge_bases;
pub mod logs;
pub mod numbers;
pub mod orders;
pub mod reservations;
pub mod seed;
pub mod webhooks;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Platform webhooks (signature-authenticated, no identity headers)
        .route("/webhooks/voiceai", post(webhooks::voiceai))
        .route("/webhooks/tool-call", post(webhooks::tool_call))
        // Health check
        .route("/health", get(health::health))
        // Bots
        .route("/api/bots", get(bots::list).post(bots::create))
        .route("/api/bots/sync", post(bots::sync))
        .route(
            "/api/bots/:bot_id",
            get(bots::show).put(bots::update).delete(bots::destroy),
        )
        // Bot knowledge-base assignments
        .route(
            "/api/bots/:bot_id/knowledge-bases",
            get(knowledge_bases::list_assignments).post(knowledge_bases::assign),
        )
        .route(
            "/api/bots/:bot_id/knowledge-bases/:assignment_id",
            delete(knowledge_bases::unassign),
        )
        // Phone numbers
        .route("/api/numbers", get(numbers::list).post(numbers::create))
        .route("/api/numbers/sync", post(numbers::sync))
        .route(
            "/api/numbers/:number_id",
            get(numbers::show)
                .put(numbers::update)
                .delete(numbers::destroy),
        )
        .route(
            "/api/numbers/:number_id/assign",
            post(numbers::assign_user).delete(numbers::unassign_user),
        )
        // Knowledge bases
        .route(
            "/api/knowledge-bases",
            get(knowledge_bases::list).post(knowledge_bases::create),
        )
        .route(
            "/api/knowledge-bases/:knowledge_base_id",
            get(knowledge_bases::show)
                .put(knowledge_bases::update)
                .delete(knowledge_bases::destroy),
        )
        // Calls and derived records
        .route("/api/calls", get(calls::list))
        .route("/api/calls/:call_id", get(calls::show))
        .route("/api/orders", get(orders::list))
        .route("/api/reservations", get(reservations::list))
        // Operations
        .route("/api/webhook-logs", get(logs::list))
        .route("/api/debug/remote-calls", get(debug::remote_calls))
        .route("/api/setup/seed", post(seed::seed))
}
