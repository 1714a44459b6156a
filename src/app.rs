//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_driver_config, validate_config},
    driver::SpeedTester,
    error::Result,
    logging::{init_logging, LogSettings},
    models::metrics::FullTestReport,
    output::{report_json, OutputCoordinator},
};
use tracing::debug;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run one full measurement and print it
    ///
    /// The summary goes to stderr and the JSON report to stdout, so the
    /// report can be piped on its own. Sub-test failures do not make this
    /// return `Err`; they are carried in the returned report.
    pub async fn run(self) -> Result<FullTestReport> {
        let config = load_driver_config(self.cli)?;

        // a second init only happens when embedded in tests
        let _ = init_logging(LogSettings::for_driver(
            config.verbose,
            config.debug,
            config.enable_color,
        ));

        let warnings = validate_config(&config)?;
        let coordinator = OutputCoordinator::for_console(config.enable_color, config.verbose);

        if !warnings.is_empty() {
            eprintln!("{}", coordinator.display_warnings(&warnings));
        }

        debug!("Configuration:\n{}", display_config_summary(&config));

        let tester = SpeedTester::connect(&config.server_url, config.timeout())?;
        let report = tester.run_full_test(&config.test_options()).await;

        eprint!("{}", coordinator.display_report(&report)?);
        println!("{}", report_json(&report, config.pretty)?);

        Ok(report)
    }
}
