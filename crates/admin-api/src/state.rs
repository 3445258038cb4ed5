//! Application state shared across handlers.

use std::sync::Arc;

use call_tools::Dispatcher;
use database::Database;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Server configuration.
    pub config: Arc<Config>,
    /// Mid-call tool dispatcher.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            dispatcher: Arc::new(Dispatcher::new()),
        }
    }
}
