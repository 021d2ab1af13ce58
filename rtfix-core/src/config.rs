//! Fixture configuration types
//!
//! The endpoint table is loaded from TOML (or built in code) and handed to
//! [`EndpointRegistry::from_config`](crate::EndpointRegistry::from_config),
//! which validates every scenario before the server starts.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Greeting payload sent by the scripted scenarios
pub const DEFAULT_GREETING: &str = "Hello!";
/// Delay before the delayed scenario sends its greeting
pub const DEFAULT_SEND_DELAY_MS: u64 = 1000;
/// Delay between the delayed greeting and the server-issued close
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 1000;
/// Named event relayed by the acknowledged-echo scenario
pub const DEFAULT_ECHO_EVENT: &str = "msg";
/// Event name carrying plain messages on enhanced sessions
pub const MESSAGE_EVENT: &str = "message";

/// Which session provider framing an endpoint speaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionVariant {
    /// Unidirectional framed messages
    #[default]
    Basic,
    /// Named events with acknowledgement callbacks and broadcast
    Enhanced,
}

impl SessionVariant {
    /// Get the variant name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for SessionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario definition as written in the config file
///
/// Parameters are optional here so that a missing one can be reported with
/// the endpoint it belongs to instead of as an opaque parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioConfig {
    /// Greet, then wait for the client to hang up
    ClientCloses {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        greeting: Option<String>,
    },
    /// Greet and close straight away
    ServerClosesImmediately {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        greeting: Option<String>,
    },
    /// Greet after one delay, close after a second one
    ServerClosesDelayed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        greeting: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        send_delay_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        close_delay_ms: Option<u64>,
    },
    /// Relay a named event to every open session and acknowledge it
    AcknowledgedEcho {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<String>,
    },
    /// Accept connections and do nothing else
    Passive,
}

/// One row of the endpoint table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Path the endpoint is mounted on, e.g. `/hello/engine.io`
    pub path: String,
    /// Session provider framing
    #[serde(default)]
    pub variant: SessionVariant,
    /// Scripted lifecycle
    pub scenario: ScenarioConfig,
}

impl EndpointConfig {
    /// Create an endpoint row
    pub fn new(path: impl Into<String>, variant: SessionVariant, scenario: ScenarioConfig) -> Self {
        Self {
            path: path.into(),
            variant,
            scenario,
        }
    }
}

/// The full endpoint table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        let greeting = || Some(DEFAULT_GREETING.to_string());
        Self {
            endpoints: vec![
                EndpointConfig::new(
                    "/client_close/engine.io",
                    SessionVariant::Basic,
                    ScenarioConfig::ClientCloses {
                        greeting: greeting(),
                    },
                ),
                EndpointConfig::new(
                    "/hello/engine.io",
                    SessionVariant::Basic,
                    ScenarioConfig::ServerClosesImmediately {
                        greeting: greeting(),
                    },
                ),
                EndpointConfig::new(
                    "/hello_delay/engine.io",
                    SessionVariant::Basic,
                    ScenarioConfig::ServerClosesDelayed {
                        greeting: greeting(),
                        send_delay_ms: Some(DEFAULT_SEND_DELAY_MS),
                        close_delay_ms: Some(DEFAULT_CLOSE_DELAY_MS),
                    },
                ),
                EndpointConfig::new(
                    "/echo_ack/socket.io",
                    SessionVariant::Enhanced,
                    ScenarioConfig::AcknowledgedEcho {
                        event: Some(DEFAULT_ECHO_EVENT.to_string()),
                    },
                ),
                EndpointConfig::new("/engine.io", SessionVariant::Basic, ScenarioConfig::Passive),
            ],
        }
    }
}

impl FixtureConfig {
    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            endpoints: Vec::new(),
        }
    }

    /// Add an endpoint row
    pub fn with_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }
}
