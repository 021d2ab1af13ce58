//! rtfix serve command for running the fixture server
//!
//! Serves every endpoint in the table over WebSocket, plus `GET /api/health`,
//! until interrupted.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rtfix_server::{DEFAULT_HOST, DEFAULT_PORT, FixtureServer, ServerConfig};
use tracing::{info, warn};

use super::load_fixture;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Listen on a Unix-domain socket instead of TCP
    #[arg(long, value_name = "PATH", conflicts_with_all = ["host", "port"])]
    pub socket: Option<PathBuf>,

    /// Endpoint table (TOML); the built-in table is used when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    fn server_config(&self) -> Result<ServerConfig> {
        let fixture = load_fixture(self.config.as_deref())?;
        let config = match &self.socket {
            Some(path) => ServerConfig::unix(path),
            None => ServerConfig::new(&self.host, self.port),
        };
        Ok(config.with_fixture(fixture))
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.server_config()?;
    let socket_path = config.socket_path().map(PathBuf::from);

    info!("Starting rtfix server on {}", config.listen);
    let server = FixtureServer::new(config)?;

    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted, shutting down");
        }
    }

    if let Some(path) = socket_path {
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("Failed to remove socket {}: {}", path.display(), e);
        }
    }

    Ok(())
}
