//! rtfix-server - WebSocket session provider for the rtfix fixture
//!
//! This crate owns the network side: it routes each upgrade request to a
//! registered endpoint, runs one [`rtfix_core::LifecycleDriver`] per
//! connection, and serves a small health API next to the fixture paths.

mod error;
pub mod http;
mod state;
pub mod ws;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rtfix_core::FixtureConfig;
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tracing::info;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// Default TCP host
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default TCP port
pub const DEFAULT_PORT: u16 = 7744;

/// The fixture server
pub struct FixtureServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl FixtureServer {
    /// Create a server, validating the endpoint table
    ///
    /// A bad endpoint table is fatal here, before anything binds.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = Arc::new(AppState::new(&config.fixture)?);
        Ok(Self { config, state })
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        match &self.config.listen {
            Listen::Tcp { .. } => {
                let addr = self.config.listen.to_string();
                let listener = TcpListener::bind(&addr)
                    .await
                    .map_err(|e| ServerError::Bind {
                        addr: addr.clone(),
                        source: e,
                    })?;
                self.run_with_listener(listener).await
            }
            #[cfg(unix)]
            Listen::Unix { path } => {
                let path = path.clone();
                remove_stale_socket(&path)?;
                let listener = UnixListener::bind(&path).map_err(|e| ServerError::Bind {
                    addr: path.display().to_string(),
                    source: e,
                })?;
                self.run_with_unix_listener(listener).await
            }
            #[cfg(not(unix))]
            Listen::Unix { path } => Err(ServerError::Internal(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))),
        }
    }

    /// Run the server on an already-bound TCP listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        info!(
            "rtfix listening on {} ({} endpoints)",
            addr,
            self.state.registry.len()
        );

        let router = create_router(self.state);
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server on an already-bound Unix-domain listener
    #[cfg(unix)]
    pub async fn run_with_unix_listener(self, listener: UnixListener) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        info!(
            "rtfix listening on {:?} ({} endpoints)",
            addr,
            self.state.registry.len()
        );

        let router = create_router(self.state);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Remove a socket file left behind by an earlier run
///
/// Anything at `path` that is not a socket is left alone and the bind fails.
#[cfg(unix)]
pub fn remove_stale_socket(path: &Path) -> Result<(), ServerError> {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            std::fs::remove_file(path)?;
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Where the server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listen {
    Tcp { host: String, port: u16 },
    Unix { path: PathBuf },
}

impl fmt::Display for Listen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Self::Unix { path } => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub listen: Listen,
    /// Endpoint table
    pub fixture: FixtureConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// Listen on TCP with the default endpoint table
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            listen: Listen::Tcp {
                host: host.into(),
                port,
            },
            fixture: FixtureConfig::default(),
        }
    }

    /// Listen on a Unix-domain socket with the default endpoint table
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self {
            listen: Listen::Unix { path: path.into() },
            fixture: FixtureConfig::default(),
        }
    }

    /// Replace the endpoint table
    pub fn with_fixture(mut self, fixture: FixtureConfig) -> Self {
        self.fixture = fixture;
        self
    }

    /// Socket file this config binds, if any
    pub fn socket_path(&self) -> Option<&Path> {
        match &self.listen {
            Listen::Unix { path } => Some(path),
            Listen::Tcp { .. } => None,
        }
    }
}
