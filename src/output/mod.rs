//! Output formatting and display system
//!
//! A run produces two outputs: a human-readable summary for the terminal
//! and the JSON report for machines. Formatters render the first; the
//! coordinator renders both.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};

use crate::{
    config::ValidationWarning,
    error::{AppError, Result},
    models::metrics::FullTestReport,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Renders a finished run for display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    use_color: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            formatter,
            use_color: false,
        }
    }

    pub fn for_console(enable_color: bool, verbose: bool) -> Self {
        Self {
            formatter: OutputFormatterFactory::create_formatter(enable_color, verbose),
            use_color: enable_color,
        }
    }

    /// Human-readable summary of `report`
    pub fn display_report(&self, report: &FullTestReport) -> Result<String> {
        self.formatter.format_report(report)
    }

    /// Configuration warnings, one per line
    pub fn display_warnings(&self, warnings: &[ValidationWarning]) -> String {
        warnings
            .iter()
            .map(|w| w.format(self.use_color))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serialize the report as JSON
pub fn report_json(report: &FullTestReport, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.map_err(|e| AppError::internal(format!("Failed to serialize report: {}", e)))
}
