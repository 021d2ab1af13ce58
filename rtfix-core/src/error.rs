//! Error types for rtfix-core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for rtfix-core
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Errors raised while routing a connection to an endpoint
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No endpoint registered for path {0}")]
    UnknownPath(String),
}

/// Errors in the endpoint table. Always fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Endpoint {path}: missing required parameter `{parameter}`")]
    MissingParameter {
        path: String,
        parameter: &'static str,
    },

    #[error("Endpoint {path}: invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        path: String,
        parameter: &'static str,
        reason: String,
    },

    #[error("Invalid endpoint path: {0:?}")]
    InvalidPath(String),

    #[error("Endpoint path registered twice: {0}")]
    DuplicatePath(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised by commands issued to a session
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A command targeted a session that is no longer open. Suppressed by the
    /// driver and only ever logged at debug level.
    #[error("Stale {action} on session {session_id}: session is {status}")]
    StaleAction {
        session_id: String,
        action: &'static str,
        status: &'static str,
    },

    #[error("Transport for session {0} is closed")]
    TransportClosed(String),
}

impl SessionError {
    /// Whether this error is the suppressed stale-action kind
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleAction { .. })
    }
}
