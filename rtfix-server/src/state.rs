//! Shared application state for the fixture server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rtfix_core::{ConfigError, EchoGroups, EndpointRegistry, FixtureConfig};

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Endpoint table, fixed at startup
    pub registry: Arc<EndpointRegistry>,
    /// Live echo groups, one per acknowledged-echo endpoint
    pub groups: Arc<EchoGroups>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state from a fixture configuration
    pub fn new(fixture: &FixtureConfig) -> Result<Self, ConfigError> {
        let registry = EndpointRegistry::from_config(fixture)?;
        Ok(Self::with_registry(Arc::new(registry)))
    }

    /// Create state around an existing registry (for testing)
    pub fn with_registry(registry: Arc<EndpointRegistry>) -> Self {
        Self {
            registry,
            groups: Arc::new(EchoGroups::new()),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
