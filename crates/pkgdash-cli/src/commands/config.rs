//! Config command - show or change the backend address.

use super::print_json;
use crate::context::Context;
use crate::output::{success, warning};
use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use pkgdash_config::UrlSource;
use serde::Serialize;
use std::process::ExitCode;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the backend address in use
    Get,

    /// Store a new backend address
    Set {
        /// Absolute http(s) address, e.g. https://pkgdash.example.org
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Forget the stored address and use the default
    Reset,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackendReport<'a> {
    backend_url: &'a str,
    source: &'a str,
}

/// Only absolute http(s) addresses are accepted.
fn validate(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = match url::Url::parse(trimmed) {
        Ok(url) => url,
        Err(e) => bail!("invalid backend address '{trimmed}': {e}"),
    };
    if !matches!(url.scheme(), "http" | "https") {
        bail!("backend address must use http or https, got '{}'", url.scheme());
    }
    Ok(trimmed.to_string())
}

/// Run the config command
pub fn run(args: &ConfigArgs, ctx: &Context) -> Result<ExitCode> {
    let backend = ctx.backend();
    if ctx.backend_override && !matches!(args.command, ConfigCommand::Get) {
        warning("--backend is set; the change only applies to this invocation");
    }

    match &args.command {
        ConfigCommand::Get => {
            let (url, source) = backend.resolve()?;
            let source = match source {
                UrlSource::Store if ctx.backend_override => "command line",
                other => describe(other),
            };
            if ctx.is_json() {
                print_json(&BackendReport {
                    backend_url: &url,
                    source,
                })?;
            } else {
                println!("{url}");
                if ctx.is_verbose() {
                    println!("{}", ctx.theme.dim(&format!("source: {source}")));
                }
            }
        }
        ConfigCommand::Set { url } => {
            let url = validate(url)?;
            backend.set_base_url(&url)?;
            success(&format!("Backend set to {url}"));
        }
        ConfigCommand::Reset => {
            backend.reset()?;
            success(&format!("Backend reset to {}", backend.default_url()));
        }
    }
    Ok(ExitCode::SUCCESS)
}

const fn describe(source: UrlSource) -> &'static str {
    match source {
        UrlSource::Store => "config file",
        UrlSource::Default => "default",
    }
}
