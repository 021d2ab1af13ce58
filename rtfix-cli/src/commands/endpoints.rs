//! rtfix endpoints command: print the endpoint table

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use rtfix_core::{Endpoint, EndpointRegistry, Scenario};

use super::load_fixture;

/// Arguments for the endpoints command
#[derive(Debug, Args)]
pub struct EndpointsArgs {
    /// Endpoint table (TOML); the built-in table is used when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Run the endpoints command
///
/// The table is validated the same way `serve` validates it, so a bad
/// config fails here too.
pub fn run(args: EndpointsArgs) -> Result<()> {
    let fixture = load_fixture(args.config.as_deref())?;
    let registry = EndpointRegistry::from_config(&fixture)?;

    if registry.is_empty() {
        println!("No endpoints configured.");
        return Ok(());
    }

    println!("{}", render(&registry));
    Ok(())
}

fn render(registry: &EndpointRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Cyan),
        Cell::new("Scenario").fg(Color::Cyan),
        Cell::new("Variant").fg(Color::Cyan),
        Cell::new("Details").fg(Color::Cyan),
    ]);

    for endpoint in registry.endpoints() {
        table.add_row(vec![
            Cell::new(endpoint.path()),
            Cell::new(endpoint.scenario().kind()),
            Cell::new(endpoint.variant()),
            Cell::new(details(endpoint)),
        ]);
    }

    table
}

/// Scenario parameters in one line
fn details(endpoint: &Endpoint) -> String {
    match endpoint.scenario() {
        Scenario::ClientCloses { greeting } => format!("greeting {:?}", greeting),
        Scenario::ServerClosesImmediately { greeting } => {
            format!("greeting {:?}, then close", greeting)
        }
        Scenario::ServerClosesDelayed {
            greeting,
            send_after,
            close_after,
        } => format!(
            "greeting {:?} after {}ms, close {}ms later",
            greeting,
            send_after.as_millis(),
            close_after.as_millis()
        ),
        Scenario::AcknowledgedEcho { event } => format!("echo event {:?}", event),
        Scenario::Passive => "-".to_string(),
    }
}
