//! Network Speed Tester - measurement driver CLI
//!
//! Runs latency, download and upload measurements against an nst-server
//! endpoint and prints a JSON report.

use clap::Parser;
use net_speed_tester::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter, Result},
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue with the command line you ran.");
        process::exit(99);
    }));

    let cli = Cli::parse();

    if cli.should_show_topic_help() {
        println!("{}", cli.display_help());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(message) = cli.validate() {
        reporter.report_error(&AppError::config(message));
        process::exit(1);
    }

    match run_application(cli).await {
        Ok(true) => {}
        // the report already carries the failure
        Ok(false) => process::exit(1),
        Err(e) => {
            reporter.report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Returns whether every requested measurement succeeded
async fn run_application(cli: Cli) -> Result<bool> {
    let report = App::new(cli)?.run().await?;
    Ok(report.error.is_none())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Usage: nst <SERVER_URL> [OPTIONS]");
            eprintln!("  - The server URL may also come from SPEEDTEST_SERVER_URL");
            eprintln!("  - URLs must start with http:// or https://");
            eprintln!("  - Run 'nst --help-topic config' for environment variables");
        }
        AppError::Connection(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that nst-server is running and reachable");
            eprintln!("  - Verify firewall settings");
            eprintln!("  - Increase the timeout with --timeout");
        }
        _ => {}
    }
}
