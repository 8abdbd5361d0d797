use std::sync::Arc;

use clap::Parser;

use remcli::cli::Cli;
use remcli::dates::{Clock, SystemClock};
use remcli::logging::init_tracing;
use remcli::platform::default_runner;
use remcli::{AutomationBridge, Dispatcher, Server};

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();
    let cli = Cli::parse();

    let runner = default_runner();
    tracing::info!(runner = runner.id(), "using script runner");
    let clock = SystemClock::new();
    tracing::info!(locale = ?clock.locale(), "using host locale");
    let bridge = AutomationBridge::new(runner, Arc::new(clock), &cli.bridge_config());
    let mut server = Server::start(&cli.server_config(), Dispatcher::new(Arc::new(bridge))).await?;

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {error}");
    }
    tracing::info!("shutting down");
    server.shutdown()
}
