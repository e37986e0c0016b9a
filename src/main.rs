//! koddi-healthcheck CLI entry point
//!
//! End-to-end health check for a Koddi Ads deployment.

use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use koddi_healthcheck::checks::CheckKind;
use koddi_healthcheck::cli::args::{Cli, Command, OutputFormat};
use koddi_healthcheck::cli::output::{get_formatter, TerminalProgress};
use koddi_healthcheck::engine::orchestrator::{NoopObserver, RunObserver};
use koddi_healthcheck::version::get_build_info;
use koddi_healthcheck::{run_healthcheck, RunConfig};

/// Exit code for configuration and runtime errors
const EXIT_RUNTIME_ERROR: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.selected_command() {
        Command::Version => {
            println!("{}", get_build_info());
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            print_check_list();
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => run_checks(&cli),
    }
}

/// Initialize tracing on stderr. `RUST_LOG` overrides the -v count.
fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn print_check_list() {
    println!("Available checks (run in this order):");
    println!();
    for kind in CheckKind::ALL {
        println!("  {}  {:<30} {}", kind.number(), kind.name(), kind.description());
    }
    println!();
    println!("Checks 2-6 are skipped when authentication fails.");
    println!("Checks 3-4 are skipped when the advertiser check fails.");
}

fn run_checks(cli: &Cli) -> Result<ExitCode> {
    let config = RunConfig::from_args(&cli.run).context("invalid run configuration")?;

    let format = cli.output.effective_format();
    let color_disabled = cli.output.no_color || std::env::var_os("NO_COLOR").is_some();
    let show_progress = format == OutputFormat::Text && !cli.quiet && cli.output.output.is_none();

    let mut progress;
    let mut silent = NoopObserver;
    let observer: &mut dyn RunObserver = if show_progress {
        progress = TerminalProgress::new(
            io::stderr(),
            !color_disabled && console::colors_enabled_stderr(),
        );
        &mut progress
    } else {
        &mut silent
    };

    let report = run_healthcheck(&config, observer).context("health check could not run")?;

    match &cli.output.output {
        Some(path) => {
            let formatter = get_formatter(format, false, cli.verbose > 0);
            let mut rendered = formatter.format(&report);
            rendered.push('\n');
            fs::write(path, rendered)
                .with_context(|| format!("writing report to {}", path.display()))?;
            if !cli.quiet {
                eprintln!("Report written to {} (overall: {})", path.display(), report.overall);
            }
        }
        None => {
            let color = !color_disabled && console::colors_enabled();
            let formatter = get_formatter(format, color, cli.verbose > 0);
            println!("{}", formatter.format(&report));
        }
    }

    Ok(ExitCode::from(report.overall.exit_code()))
}
