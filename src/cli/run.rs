//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, resolves configuration, starts tracing, builds
//! the tokio runtime, dispatches the command and prints every error itself.

use anyhow::Result;
use clap::Parser;

use sheetsplit_utils::error::{SheetSplitError, UserFriendlyError};
use sheetsplit_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;
use crate::{CliArgs, Config, ExitCode};

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing the error report; main.rs only maps
/// the code to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let cli_args = cli_args_for(&cli);
    let operation = cli.command.operation();

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err, "config")),
    };

    // A subscriber may already be installed when embedded; keep going without ours
    let _ = init_tracing(config.verbose());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Split {
                root, json, strict, ..
            } => commands::execute_split_command(&root, &config, json, strict).await,
            Commands::Merge {
                files,
                output,
                from_dir,
                json,
                strict,
                ..
            } => {
                commands::execute_merge_command(
                    &files,
                    from_dir.as_deref(),
                    &output,
                    &config,
                    json,
                    strict,
                )
                .await
            }
            Commands::Config { json } => commands::execute_config_command(&config, json),
        }
    });

    // Loads abandoned after a timeout may still be parsing; do not wait for them
    rt.shutdown_background();

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(error) => Err(report_error(&error, operation)),
    }
}

/// Collect the configuration-relevant flags of the parsed command line
pub(crate) fn cli_args_for(cli: &Cli) -> CliArgs {
    let mut args = CliArgs {
        config_path: cli.config.clone(),
        verbose: cli.verbose.then_some(true),
        ..CliArgs::default()
    };

    match &cli.command {
        Commands::Split {
            group_size,
            output,
            workers,
            load_timeout,
            identity_column,
            ..
        } => {
            args.group_size = *group_size;
            args.output_dir = output.clone();
            args.workers = *workers;
            args.load_timeout_secs = *load_timeout;
            args.identity_column = identity_column.clone();
        }
        Commands::Merge {
            workers,
            load_timeout,
            ..
        } => {
            args.workers = *workers;
            args.load_timeout_secs = *load_timeout;
        }
        Commands::Config { .. } => {}
    }

    args
}

/// Print an error report on stderr and pick the exit code
fn report_error(error: &anyhow::Error, operation: &str) -> ExitCode {
    if let Some(err) = error.downcast_ref::<SheetSplitError>() {
        eprintln!("✗ {operation} failed [{}]", err.category());
        eprintln!("{}", err.display_for_user());
        return err.to_exit_code();
    }

    eprintln!("✗ Unexpected error during {operation}: {error:#}");
    eprintln!("\n  General troubleshooting:");
    eprintln!("    - Run with --verbose for more detailed output");
    eprintln!("    - Check that the input and output paths are accessible");
    ExitCode::INTERNAL
}
