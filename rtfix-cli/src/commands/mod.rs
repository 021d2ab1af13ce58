//! Subcommands of the rtfix binary

pub mod endpoints;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use rtfix_core::FixtureConfig;
use tracing::debug;

/// Endpoint table from `--config`, or the built-in table
pub fn load_fixture(path: Option<&Path>) -> Result<FixtureConfig> {
    match path {
        Some(path) => {
            debug!("Loading endpoint table from {}", path.display());
            FixtureConfig::load(path)
                .with_context(|| format!("loading fixture config {}", path.display()))
        }
        None => Ok(FixtureConfig::default()),
    }
}
