//! Validated lifecycle scripts
//!
//! A [`Scenario`] is the checked form of a [`ScenarioConfig`]: every
//! parameter the script needs is present, so the driver never has to decide
//! what a missing delay means.

use std::fmt;
use std::time::Duration;

use crate::config::ScenarioConfig;
use crate::error::ConfigError;

/// Lifecycle script enacted for every session on an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// Greet immediately; never close from the server side
    ClientCloses { greeting: String },
    /// Greet, then close at once
    ServerClosesImmediately { greeting: String },
    /// Greet after `send_after`, close `close_after` later
    ServerClosesDelayed {
        greeting: String,
        send_after: Duration,
        close_after: Duration,
    },
    /// Fan a named event out to the endpoint's echo group, then ack it
    AcknowledgedEcho { event: String },
    /// No scripted behaviour
    Passive,
}

/// Fieldless discriminant of [`Scenario`], used for logging and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    ClientCloses,
    ServerClosesImmediately,
    ServerClosesDelayed,
    AcknowledgedEcho,
    Passive,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCloses => "client_closes",
            Self::ServerClosesImmediately => "server_closes_immediately",
            Self::ServerClosesDelayed => "server_closes_delayed",
            Self::AcknowledgedEcho => "acknowledged_echo",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Scenario {
    /// Validate a config entry for the endpoint mounted at `path`
    pub fn from_config(path: &str, config: &ScenarioConfig) -> Result<Self, ConfigError> {
        let require_greeting = |greeting: &Option<String>| {
            greeting.clone().ok_or_else(|| ConfigError::MissingParameter {
                path: path.to_string(),
                parameter: "greeting",
            })
        };

        let scenario = match config {
            ScenarioConfig::ClientCloses { greeting } => Self::ClientCloses {
                greeting: require_greeting(greeting)?,
            },
            ScenarioConfig::ServerClosesImmediately { greeting } => {
                Self::ServerClosesImmediately {
                    greeting: require_greeting(greeting)?,
                }
            }
            ScenarioConfig::ServerClosesDelayed {
                greeting,
                send_delay_ms,
                close_delay_ms,
            } => {
                let greeting = require_greeting(greeting)?;
                let send_delay_ms = send_delay_ms.ok_or_else(|| ConfigError::MissingParameter {
                    path: path.to_string(),
                    parameter: "send_delay_ms",
                })?;
                let close_delay_ms =
                    close_delay_ms.ok_or_else(|| ConfigError::MissingParameter {
                        path: path.to_string(),
                        parameter: "close_delay_ms",
                    })?;
                Self::ServerClosesDelayed {
                    greeting,
                    send_after: Duration::from_millis(send_delay_ms),
                    close_after: Duration::from_millis(close_delay_ms),
                }
            }
            ScenarioConfig::AcknowledgedEcho { event } => {
                let event = event.clone().ok_or_else(|| ConfigError::MissingParameter {
                    path: path.to_string(),
                    parameter: "event",
                })?;
                if event.trim().is_empty() {
                    return Err(ConfigError::InvalidParameter {
                        path: path.to_string(),
                        parameter: "event",
                        reason: "event name must not be empty".to_string(),
                    });
                }
                Self::AcknowledgedEcho { event }
            }
            ScenarioConfig::Passive => Self::Passive,
        };

        Ok(scenario)
    }

    pub fn kind(&self) -> ScenarioKind {
        match self {
            Self::ClientCloses { .. } => ScenarioKind::ClientCloses,
            Self::ServerClosesImmediately { .. } => ScenarioKind::ServerClosesImmediately,
            Self::ServerClosesDelayed { .. } => ScenarioKind::ServerClosesDelayed,
            Self::AcknowledgedEcho { .. } => ScenarioKind::AcknowledgedEcho,
            Self::Passive => ScenarioKind::Passive,
        }
    }

    /// Whether sessions on this scenario belong to an echo group
    pub fn uses_echo_group(&self) -> bool {
        matches!(self, Self::AcknowledgedEcho { .. })
    }
}
