//! pkgdash CLI - browse packages, their source repositories, dependencies and
//! health alerts as tracked by a pkgdash backend.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod chart;
mod commands;
mod context;
mod output;

use clap::Parser;
use commands::Cli;
use context::Context;
use std::process::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_ansi)
        .with_writer(std::io::stderr)
        .init();

    let ctx = match Context::new(&cli.to_context_args()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::error(&format!("Failed to initialize: {e:#}"));
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            output::error(&format!("Failed to start async runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(commands::run(&cli.command, &ctx));
    debug!(
        elapsed = %output::format_duration(ctx.start_time.elapsed()),
        "command finished"
    );

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
