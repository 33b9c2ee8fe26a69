//! route-source: source address and egress interface selection
//!
//! Entry point for the route-source application.

use route_source::config::{Cli, Command, ValidatedConfig, write_default_config};
use route_source::route::PlatformResolver;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, print_run_hint, setup_tracing};
use run::Outcome;

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Command::Init { output } = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(&config, &cli.command)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs one command against the system resolver.
///
/// Excluded from coverage - requires the platform routing socket.
#[cfg(not(tarpaulin_include))]
fn run_application(config: &ValidatedConfig, command: &Command) -> ExitCode {
    let resolver = PlatformResolver::platform().with_policy(config.fast_path);
    let mut stdout = std::io::stdout().lock();

    match run::execute(&resolver, command, config.format, &mut stdout) {
        Ok(Outcome::Done | Outcome::Found) => exit_code::SUCCESS,
        Ok(Outcome::NotFound) => exit_code::not_found(),
        Err(e) => {
            tracing::error!("{e}");
            print_run_hint(&e);
            exit_code::runtime_error()
        }
    }
}
