//! HTTP gateway to the remote voice-AI platform.
//!
//! All traffic to the platform goes through [`PlatformClient`]: bearer-token
//! auth, JSON in and out, and uniform error mapping. A client is constructed
//! per request with the tenant's resolved [`ApiCredential`]; nothing here is
//! a process-wide singleton, and nothing here touches the database.

pub mod client;
pub mod credential;
pub mod error;
pub mod types;

pub use client::PlatformClient;
pub use credential::ApiCredential;
pub use error::{PlatformError, Result};
