//! Network Speed Tester - measurement endpoint
//!
//! Serves the ping, download, upload, network-info and health endpoints
//! until interrupted.

use clap::Parser;
use net_speed_tester::{
    build_info,
    cli::ServerCli,
    config::load_server_config,
    error::{ErrorReporter, Result},
    logging::{init_logging, LogSettings},
    server::{shutdown_signal, HttpServer},
};
use std::process;
use tracing::info;

#[tokio::main]
async fn main() {
    // handler panics are answered with a 500; keep the process alive
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Server panic: {}", panic_info);
    }));

    let cli = ServerCli::parse();
    let verbose = cli.verbose || cli.debug;

    if let Err(e) = run_server(cli).await {
        ErrorReporter::new(false, verbose).report_error(&e);
        process::exit(e.exit_code());
    }
}

async fn run_server(cli: ServerCli) -> Result<()> {
    let config = load_server_config(cli)?;
    init_logging(LogSettings::for_server(config.verbose, config.debug, config.json_logs))?;

    info!("{}", build_info());
    info!(
        max_download_kb = config.max_download_kb,
        body_limit_bytes = config.body_limit_bytes,
        trust_forwarded_for = config.trust_forwarded_for,
        "Starting measurement endpoint"
    );

    let server = HttpServer::bind(config).await?;
    server.run(shutdown_signal()).await
}
