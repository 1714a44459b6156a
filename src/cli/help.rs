//! Long-form help text with usage examples and topic pages

use crate::config::env::EnvManager;
use colored::*;

/// Help pages for the driver binary
pub struct HelpSystem;

impl HelpSystem {
    pub fn new() -> Self {
        Self
    }

    /// Display the main help message with all available options
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();

        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.format_usage_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_options_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_examples_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_environment_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_footer(use_colors));

        help
    }

    /// Display quick help for specific topics
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "config" | "configuration" | "env" => Some(self.format_configuration_help(use_colors)),
            "endpoints" | "server" => Some(self.format_endpoints_help(use_colors)),
            "examples" => Some(self.format_examples_section(use_colors)),
            "output" | "report" => Some(self.format_output_help(use_colors)),
            _ => None,
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "Network Speed Tester";
        let subtitle = crate::PKG_DESCRIPTION;
        let version = crate::VERSION;

        if use_colors {
            format!(
                "{}\n{}\nVersion: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green()
            )
        } else {
            format!("{}\n{}\nVersion: {}\n", title, subtitle, version)
        }
    }

    fn format_usage_section(&self, use_colors: bool) -> String {
        let mut usage = format!("{}\n", section_header("USAGE:", use_colors));
        for pattern in [
            "nst <SERVER_URL> [OPTIONS]",
            "SPEEDTEST_SERVER_URL=<SERVER_URL> nst [OPTIONS]",
            "nst --help-topic <TOPIC>",
        ] {
            if use_colors {
                usage.push_str(&format!("  {}\n", pattern.bright_white()));
            } else {
                usage.push_str(&format!("  {}\n", pattern));
            }
        }
        usage
    }

    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            OptionHelp {
                short: Some("d"),
                long: "download-size",
                value: "<KB>",
                description: "Download test size in KB (default 1000)",
                example: Some("--download-size 5000"),
            },
            OptionHelp {
                short: Some("u"),
                long: "upload-size",
                value: "<KB>",
                description: "Upload test size in KB (default 1000)",
                example: None,
            },
            OptionHelp {
                short: Some("p"),
                long: "ping-count",
                value: "<N>",
                description: "Number of latency samples (1-1000, default 5)",
                example: Some("--ping-count 20"),
            },
            OptionHelp {
                short: Some("t"),
                long: "timeout",
                value: "<SECONDS>",
                description: "Per-request timeout in seconds (1-600, default 120)",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "no-latency / --no-download / --no-upload",
                value: "",
                description: "Skip a sub-test",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "continue-on-error",
                value: "",
                description: "Run the remaining sub-tests after a failure",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "compact",
                value: "",
                description: "Print the JSON report on one line",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "verbose / --debug",
                value: "",
                description: "Progress logging on stderr",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "color / --no-color",
                value: "",
                description: "Force or disable colored summary output",
                example: None,
            },
        ];

        let mut output = format!("{}\n", section_header("OPTIONS:", use_colors));
        for option in options {
            output.push_str(&option.format(use_colors));
            output.push('\n');
        }
        output
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Full test against a local server",
                command: "nst http://localhost:3001",
                description: "Latency, 1000KB download, 1000KB upload, then network info",
            },
            ExampleHelp {
                title: "Latency only",
                command: "nst http://localhost:3001 --no-download --no-upload --ping-count 20",
                description: "Twenty pings and the network info snapshot",
            },
            ExampleHelp {
                title: "Large transfers, machine-readable",
                command: "nst https://speed.example.com -d 10240 -u 5000 --compact > report.json",
                description: "Summary goes to stderr, the JSON report to the file",
            },
        ];

        let mut output = format!("{}\n", section_header("EXAMPLES:", use_colors));
        for example in examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }
        output
    }

    fn format_environment_section(&self, use_colors: bool) -> String {
        let mut output = format!("{}\n", section_header("ENVIRONMENT VARIABLES:", use_colors));
        output.push_str("Configuration priority: CLI arguments > Environment variables > .env file > Defaults\n\n");

        for (var_name, description, _example) in EnvManager::get_supported_env_vars() {
            if use_colors {
                output.push_str(&format!("  {}: {}\n", var_name.bright_yellow().bold(), description.white()));
            } else {
                output.push_str(&format!("  {}: {}\n", var_name, description));
            }
        }

        output
    }

    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", section_header("ADDITIONAL HELP:", use_colors));

        for (command, description) in [
            ("--help-topic config", "Configuration sources and limits"),
            ("--help-topic endpoints", "What the server answers"),
            ("--help-topic examples", "Usage examples"),
            ("--help-topic output", "Report fields and exit codes"),
        ] {
            if use_colors {
                footer.push_str(&format!("  {}: {}\n", command.bright_yellow(), description.white()));
            } else {
                footer.push_str(&format!("  {}: {}\n", command, description));
            }
        }

        footer
    }

    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", section_header("CONFIGURATION REFERENCE:", use_colors));

        help.push_str("CONFIGURATION PRIORITY (highest to lowest):\n");
        help.push_str("1. Command-line arguments\n");
        help.push_str("2. Environment variables\n");
        help.push_str("3. .env file in the working directory (or --env-file)\n");
        help.push_str("4. Default values\n\n");

        help.push_str("PARAMETER LIMITS:\n");
        help.push_str("- Ping count: 1-1000 samples\n");
        help.push_str("- Timeout: 1-600 seconds per request\n");
        help.push_str("- Transfer sizes: at least 1 KB; the server caps downloads (10240 KB by default)\n");
        help.push_str("- Server URL: http or https with a host; a trailing slash is ignored\n\n");

        help.push_str("EXAMPLE .env FILE:\n");
        help.push_str(&EnvManager::create_example_env_content());

        help
    }

    fn format_endpoints_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", section_header("SERVER ENDPOINTS:", use_colors));

        help.push_str("  GET  /api/ping             {timestamp, message: \"pong\"}\n");
        help.push_str("  GET  /api/download/:sizeKB {size, timestamp, data} with size clamped to the server maximum\n");
        help.push_str("  POST /api/upload           {data, timestamp, size} -> {received, clientTimestamp, dataSize, transferTime}\n");
        help.push_str("  GET  /api/network-info     {clientIP, serverTime, headers}\n");
        help.push_str("  GET  /api/health           {status, uptime, timestamp, version}\n\n");

        help.push_str("Run the server with `nst-server --port 3001`.\n");
        help
    }

    fn format_output_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", section_header("OUTPUT FORMAT:", use_colors));

        help.push_str("A human-readable summary is written to stderr; the JSON report to stdout.\n\n");
        help.push_str("REPORT FIELDS:\n");
        help.push_str("- serverUrl, timestamp (RFC 3339)\n");
        help.push_str("- tests.latency: average, min, max (ms), n_samples\n");
        help.push_str("- tests.download / tests.upload: sizeKB, transferTime (ms), speedBps, speedKbps, speedMbps\n");
        help.push_str("- tests.networkInfo: clientIP, serverTime, headers\n");
        help.push_str("- error: present when a sub-test failed\n\n");

        help.push_str("EXIT CODES:\n");
        help.push_str("- 0: every sub-test that ran succeeded\n");
        help.push_str("- 1: missing URL, invalid configuration, or a failed sub-test\n");

        help
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn section_header(title: &str, use_colors: bool) -> String {
    if use_colors {
        title.bright_green().bold().to_string()
    } else {
        title.to_string()
    }
}

/// Helper struct for formatting individual options
struct OptionHelp {
    short: Option<&'static str>,
    long: &'static str,
    value: &'static str,
    description: &'static str,
    example: Option<&'static str>,
}

impl OptionHelp {
    fn format(&self, use_colors: bool) -> String {
        let mut option_str = String::new();

        if let Some(short) = self.short {
            if use_colors {
                option_str.push_str(&format!("  {}, ", format!("-{}", short).bright_cyan()));
            } else {
                option_str.push_str(&format!("  -{}, ", short));
            }
        } else {
            option_str.push_str("      ");
        }

        let long_with_value = if self.value.is_empty() {
            format!("--{}", self.long)
        } else {
            format!("--{} {}", self.long, self.value)
        };

        if use_colors {
            option_str.push_str(&format!("{:<30} {}", long_with_value.bright_cyan(), self.description.white()));
        } else {
            option_str.push_str(&format!("{:<30} {}", long_with_value, self.description));
        }

        if let Some(example) = self.example {
            if use_colors {
                option_str.push_str(&format!(
                    "\n{}{}",
                    " ".repeat(36),
                    format!("Example: {}", example).bright_blue().italic()
                ));
            } else {
                option_str.push_str(&format!("\n{}Example: {}", " ".repeat(36), example));
            }
        }

        option_str
    }
}

/// Helper struct for formatting examples
struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!(
                "  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}
