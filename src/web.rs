#![cfg(not(tarpaulin_include))]

use sheet_tally::app;
use sheet_tally::config::AppConfig;
use std::env;

/// Main entry point for the web application
///
/// Reads `SHEET_TALLY_*` settings from the environment and serves the upload
/// and save pages.
///
/// # Arguments
/// * First command line argument, if present, overrides the listen address
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = AppConfig::from_env();
    if let Some(addr) = env::args().nth(1) {
        config.addr = addr;
    }

    log::info!(
        "Starting web server (derived from columns {} + {}, totals over column {})",
        config.roles.source_a,
        config.roles.source_b,
        config.roles.aggregate
    );
    app::run(config).await
}
