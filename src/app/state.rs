//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{MatchRegistry, MatchSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub matches: Arc<MatchRegistry>,
    /// Map and rules for newly spawned matches
    pub settings: Arc<MatchSettings>,
}

impl AppState {
    pub fn new(config: Config, settings: MatchSettings) -> Self {
        Self {
            config: Arc::new(config),
            matches: Arc::new(MatchRegistry::new()),
            settings: Arc::new(settings),
        }
    }
}
