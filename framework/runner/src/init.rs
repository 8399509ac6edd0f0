use crate::cli::PageTunnelScenarioCli;
use clap::Parser;

/// Initialise logging and the CLI for the page tunnel runner.
pub fn init() -> PageTunnelScenarioCli {
    env_logger::init();

    PageTunnelScenarioCli::parse()
}
