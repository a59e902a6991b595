//! CLI commands for pkgdash.

pub mod config;
pub mod package;
pub mod repo;

use crate::context::{Context, ContextArgs};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

/// pkgdash - browse packages and source repositories tracked by a pkgdash backend
#[derive(Parser, Debug)]
#[command(name = "pkgdash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print command output and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    pub no_ansi: bool,

    /// Print payloads as pretty JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend address for this invocation (not persisted)
    #[arg(long, global = true, value_name = "URL")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn to_context_args(&self) -> ContextArgs {
        ContextArgs {
            verbosity: self.verbose,
            quiet: self.quiet,
            no_ansi: self.no_ansi,
            json: self.json,
            backend: self.backend.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse packages
    #[command(alias = "pkg")]
    Package(package::PackageArgs),

    /// Browse source repositories
    Repo(repo::RepoArgs),

    /// Show or change the backend address
    Config(config::ConfigArgs),
}

/// Paging options shared by list and search commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u64>,

    /// Items per page
    #[arg(long)]
    pub size: Option<u64>,
}

/// Dispatch a parsed command line.
pub async fn run(command: &Commands, ctx: &Context) -> Result<ExitCode> {
    match command {
        Commands::Package(args) => package::run(args, ctx).await,
        Commands::Repo(args) => repo::run(args, ctx).await,
        Commands::Config(args) => config::run(args, ctx),
    }
}

/// Print a payload as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", sonic_rs::to_string_pretty(value)?);
    Ok(())
}

/// Exit code for a fetched value: failures were already reported.
pub(crate) fn finished<T>(value: Option<T>, render: impl FnOnce(T) -> Result<()>) -> Result<ExitCode> {
    match value {
        Some(value) => {
            render(value)?;
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

/// Render an optional field for tables.
pub(crate) fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pkgdash",
            "package",
            "distros",
            "--json",
            "-vv",
            "--backend",
            "http://localhost:9000",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        let args = cli.to_context_args();
        assert_eq!(args.backend.as_deref(), Some("http://localhost:9000"));
        assert!(matches!(cli.command, Commands::Package(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pkgdash", "-q", "-v", "repo", "list"]).is_err());
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["pkgdash"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn dash_for_missing_values() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("MIT")), "MIT");
    }
}
