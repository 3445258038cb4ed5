//! Webhook verification and call lifecycle processing.
//!
//! Inbound webhooks from the voice platform drive each call through
//! `PENDING -> IN_PROGRESS -> ENDED -> ANALYZED`. Every delivery is applied
//! in a single transaction together with its audit row, so a redelivered
//! event replays cleanly and a rejected one still leaves a trace in
//! `webhook_logs`.
//!
//! The crate has two halves:
//!
//! - [`verify_signature`] checks the HMAC-SHA256 signature the platform
//!   sends with each delivery. The HTTP layer calls it on the raw body
//!   before parsing anything.
//! - [`process_event`] applies a parsed event to the database: state
//!   transition, usage accounting, analytics upsert, and derivation of
//!   orders or reservations from the post-call analysis.

mod error;
mod event;
mod processor;
mod signature;

pub use error::{LifecycleError, Result};
pub use event::{
    CallAnalysis, CallCost, CallMetadata, CallPayload, LatencyGroup, LatencyMetrics, WebhookEvent,
};
pub use processor::process_event;
pub use signature::verify_signature;
