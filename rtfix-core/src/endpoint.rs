//! Endpoint registry
//!
//! Maps a mount path to the scenario and session variant served there. The
//! registry is built once from a [`FixtureConfig`] and is read-only after
//! that, so it can be shared between connection tasks behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::config::{FixtureConfig, ScenarioConfig, SessionVariant};
use crate::error::{ConfigError, RegistryError};
use crate::scenario::Scenario;

/// Lifecycle phase reported in the connect/close log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Close,
}

impl Phase {
    /// Human-readable tag for this phase on the given variant
    ///
    /// Basic sessions report `opened`/`closed`, enhanced sessions report
    /// `connected`/`disconnected`.
    pub fn tag(self, variant: SessionVariant) -> &'static str {
        match (variant, self) {
            (SessionVariant::Basic, Phase::Open) => "opened",
            (SessionVariant::Basic, Phase::Close) => "closed",
            (SessionVariant::Enhanced, Phase::Open) => "connected",
            (SessionVariant::Enhanced, Phase::Close) => "disconnected",
        }
    }
}

/// A mounted endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    name: String,
    variant: SessionVariant,
    scenario: Scenario,
}

impl Endpoint {
    /// Normalised mount path, e.g. `/hello/engine.io`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Short name used in log lines (first path segment)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> SessionVariant {
        self.variant
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Emit the connect/close log line for a session
    pub fn log_phase(&self, phase: Phase, session_id: &str) {
        info!(
            endpoint = %self.name,
            session = %session_id,
            "{} {}",
            self.name,
            phase.tag(self.variant)
        );
    }
}

/// Normalise a request or config path: leading `/`, no trailing `/`
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}

fn validate_path(raw: &str) -> Result<String, ConfigError> {
    let path = normalize_path(raw);
    if path == "/" || path.contains(['?', '#']) || path.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidPath(raw.to_string()));
    }
    Ok(path)
}

/// Fixed mapping from mount path to endpoint
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, Arc<Endpoint>>,
}

impl EndpointRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a config table, failing on the first bad row
    pub fn from_config(config: &FixtureConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for endpoint in &config.endpoints {
            registry.register(&endpoint.path, &endpoint.scenario, endpoint.variant)?;
        }
        Ok(registry)
    }

    /// Mount a scenario on a path
    pub fn register(
        &mut self,
        path: &str,
        scenario: &ScenarioConfig,
        variant: SessionVariant,
    ) -> Result<Arc<Endpoint>, ConfigError> {
        let path = validate_path(path)?;
        if self.endpoints.contains_key(&path) {
            return Err(ConfigError::DuplicatePath(path));
        }

        let scenario = Scenario::from_config(&path, scenario)?;
        if scenario.uses_echo_group() && variant != SessionVariant::Enhanced {
            return Err(ConfigError::InvalidParameter {
                path,
                parameter: "variant",
                reason: format!("{} needs an enhanced session", scenario.kind()),
            });
        }
        let name = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let endpoint = Arc::new(Endpoint {
            path: path.clone(),
            name,
            variant,
            scenario,
        });
        self.endpoints.insert(path, Arc::clone(&endpoint));
        Ok(endpoint)
    }

    /// Look up the endpoint serving a request path
    pub fn route(&self, path: &str) -> Result<Arc<Endpoint>, RegistryError> {
        let normalized = normalize_path(path);
        self.endpoints
            .get(&normalized)
            .cloned()
            .ok_or(RegistryError::UnknownPath(normalized))
    }

    /// All endpoints, ordered by path
    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
