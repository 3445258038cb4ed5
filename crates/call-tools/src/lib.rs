//! Tool registry and dispatch for mid-call agent actions.
//!
//! While a call is live, the voice platform invokes tools on the agent's
//! behalf against a single backend endpoint. This crate resolves each
//! invocation to the call it belongs to and runs the tool:
//!
//! - [`Dispatcher`] routes an invocation to a bot's custom webhook tools
//!   or to the built-in registry, recovering the call from the platform
//!   when the `call_started` webhook has not landed yet.
//! - [`ToolRegistry`] holds [`Tool`] implementations keyed by name.
//!
//! # Built-in Tools
//!
//! - [`CheckAvailability`] - Room availability with alternative-date
//!   suggestions, for hotel customers.
//! - [`CreateReservation`] - Book a room, one reservation per call.
//! - [`CreateOrder`] - Place a food order, one order per call.
//! - [`CheckOrderStatus`] - Look up an order by confirmation number.
//!
//! # Example
//!
//! ```rust,ignore
//! use call_tools::{Dispatcher, DispatchOutcome, ToolCallRequest};
//!
//! let dispatcher = Dispatcher::new();
//! let request: ToolCallRequest = serde_json::from_slice(&body)?;
//! match dispatcher.dispatch(db.pool(), recovery_client.as_ref(), &request).await? {
//!     DispatchOutcome::Completed { result, tool_call_id } => { /* 200 */ }
//!     DispatchOutcome::CallNotFound => { /* 404 */ }
//! }
//! ```

mod dispatcher;
mod error;
mod registry;
mod tool;
pub mod tools;

pub use dispatcher::{DispatchOutcome, Dispatcher, ToolCallRequest};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{CallContext, Tool, ToolArgs, ToolOutput};
pub use tools::{CheckAvailability, CheckOrderStatus, CreateOrder, CreateReservation};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a new registry with all built-in tools registered.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(CheckAvailability);
    registry.register(CreateReservation);
    registry.register(CreateOrder);
    registry.register(CheckOrderStatus);

    registry
}
