//! Reconciliation between the remote voice platform and local state.
//!
//! Agents and phone numbers can be created on the platform directly, so
//! the local mirror drifts. The reconcilers here pull the platform's
//! listing and converge local rows onto it:
//!
//! - [`sync_agents`] mirrors remote agents into an organization's bots.
//! - [`sync_phone_numbers`] mirrors remote numbers, resolving agent
//!   bindings to local bots.
//! - [`knowledge`] links knowledge bases to bots, keeping the remote LLM
//!   config's assignment list in step with local rows.
//!
//! Reconciliation is per-item tolerant: one bad item is reported in the
//! [`SyncSummary`] and the batch continues. Only total failures (listing
//! call, credentials) surface as errors.

use std::fmt;

use serde::Serialize;

pub mod agents;
pub mod knowledge;
pub mod numbers;

mod error;

pub use agents::sync_agents;
pub use error::{Result, SyncError};
pub use numbers::sync_phone_numbers;

/// Outcome counts of one reconciliation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    /// Rows created locally.
    pub created: u32,
    /// Rows refreshed from the remote representation.
    pub updated: u32,
    /// Items that failed and were passed over.
    pub skipped: u32,
    /// One entry per skipped item: a human-readable identifier and the
    /// failure.
    pub errors: Vec<String>,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} skipped",
            self.created, self.updated, self.skipped
        )
    }
}

/// How one remote item was converged.
pub(crate) enum Reconciled {
    Created,
    Updated,
}
