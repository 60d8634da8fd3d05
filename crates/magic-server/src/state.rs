//! Application state shared across all handlers.

use magic_core::{MagicConfig, Result};
use magic_gateway::{build_provider, Gateway};
use magic_session::{HistoryPolicy, InMemorySessionStore};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway: Arc::new(gateway), start_time: Instant::now() }
    }

    /// Wire provider, session store and gateway from configuration.
    pub fn from_config(config: &MagicConfig) -> Result<Self> {
        let provider = build_provider(&config.provider)?;
        let store = Arc::new(InMemorySessionStore::with_policy(HistoryPolicy::from(&config.session)));
        Ok(Self::new(Gateway::from_config(provider, store, &config.gateway)))
    }
}
