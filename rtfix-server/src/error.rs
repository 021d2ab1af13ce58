//! Server error types

use rtfix_core::ConfigError;
use thiserror::Error;

/// Errors that can occur in the fixture server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the listen address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while serving
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Endpoint table rejected at startup
    #[error("invalid fixture configuration: {0}")]
    Config(#[from] ConfigError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
