//! Command line arguments for koddi-healthcheck.
//!
//! Run values can come from flags, `KODDI_*` environment variables or a
//! TOML file. Values left unset here are filled in by
//! [`crate::config`], so run flags carry no clap defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Parsed command line
#[derive(Debug, Parser)]
#[command(
    name = "koddi-healthcheck",
    version,
    about = "End-to-end health check for a Koddi Ads deployment",
    long_about = "Runs seven sequential checks against the Koddi console API and the \
                  client's auction engine, then reports a pass/fail verdict.\n\n\
                  Exit codes: 0 all checks passed or warned, 1 at least one check failed, \
                  3 configuration or runtime error."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress live progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Subcommand to run, `check` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or(Command::Check)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the health check (default)
    Check,
    /// List the checks in execution order
    List,
    /// Print version and build information
    Version,
}

/// Inputs of a run
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Console login email
    #[arg(long, env = "KODDI_EMAIL", global = true)]
    pub email: Option<String>,

    /// Console login password
    #[arg(long, env = "KODDI_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Member group to inspect
    #[arg(
        long,
        env = "KODDI_MEMBER_GROUP_ID",
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub member_group_id: Option<u64>,

    /// Advertiser to inspect
    #[arg(
        long,
        env = "KODDI_ADVERTISER_ID",
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub advertiser_id: Option<u64>,

    /// Client name; also the auction engine subdomain
    #[arg(long, env = "KODDI_CLIENT_NAME", global = true)]
    pub client_name: Option<String>,

    /// Site id sent with the test auction [default: homepage]
    #[arg(long, env = "KODDI_SITE_ID", global = true)]
    pub site_id: Option<String>,

    /// Experience name sent with the test auction
    #[arg(long, env = "KODDI_EXPERIENCE_NAME", global = true)]
    pub experience_name: Option<String>,

    /// Console API base URL [default: https://koddi.io/console/v1]
    #[arg(long, env = "KODDI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(
        long,
        env = "KODDI_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: Option<u64>,

    /// Load run settings from a TOML file
    #[arg(long, env = "KODDI_HEALTHCHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

/// Report rendering options
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl OutputArgs {
    /// Format after applying `--json-output`
    pub fn effective_format(&self) -> OutputFormat {
        if self.json_output {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
    /// Standalone HTML page
    Html,
}
