//! Repository commands.

use super::package::page_footer;
use super::{PageArgs, finished, or_dash, print_json};
use crate::chart::{ChartSeries, Metric, render_metric, render_overview};
use crate::context::Context;
use crate::output::colors::{Colors, styled};
use crate::output::table::Table;
use crate::output::{Icon, Theme, format_count, header};
use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::style;
use pkgdash_core::{Page, PackageSource, Repository, RepositoryStats};
use serde::Serialize;
use std::process::ExitCode;
use tracing::info;

/// Arguments for the repo command.
#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories
    List(PageArgs),

    /// Search repositories by URL regular expression
    Search {
        /// Regular expression matched against repository URLs
        regex: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a repository with its activity and packages
    Show { url: String },

    /// Activity statistics
    Stats {
        url: String,

        /// Chart a single metric instead of the overview
        #[arg(long, value_enum)]
        metric: Option<Metric>,
    },

    /// Packages built from the repository
    Packages { url: String },
}

#[derive(Debug, Serialize)]
struct RepositoryReport<'a> {
    repository: &'a Repository,
    stats: Option<&'a [RepositoryStats]>,
    packages: Option<&'a [PackageSource]>,
}

/// Repository URLs must be absolute http(s) addresses.
fn check_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        Ok(url) => bail!("unsupported repository URL scheme '{}'", url.scheme()),
        Err(e) => bail!("invalid repository URL '{trimmed}': {e}"),
    }
}

/// Run the repo command.
pub async fn run(args: &RepoArgs, ctx: &Context) -> Result<ExitCode> {
    let api = ctx.client.repositories();
    match &args.command {
        RepoCommand::List(page) => {
            let result = ctx.load(api.list(page.page, page.size)).await;
            finished(result, |page| print_repositories(ctx, &page))
        }
        RepoCommand::Search { regex, page } => {
            info!(regex = %regex, "searching repositories");
            let result = ctx.load(api.search(regex, page.page, page.size)).await;
            finished(result, |page| print_repositories(ctx, &page))
        }
        RepoCommand::Show { url } => show(ctx, &check_url(url)?).await,
        RepoCommand::Stats { url, metric } => {
            let url = check_url(url)?;
            let result = ctx.load(api.stats(&url)).await;
            finished(result, |stats| {
                if ctx.is_json() {
                    return print_json(&stats);
                }
                let series = ChartSeries::from_stats(&stats);
                match metric {
                    Some(metric) => render_metric(&series, *metric, ctx.theme),
                    None => render_overview(&series, ctx.theme),
                }
                Ok(())
            })
        }
        RepoCommand::Packages { url } => {
            let url = check_url(url)?;
            let result = ctx.load(api.packages(&url)).await;
            finished(result, |packages| print_packages(ctx, &packages))
        }
    }
}

async fn show(ctx: &Context, url: &str) -> Result<ExitCode> {
    let api = ctx.client.repositories();
    let (repository, stats, packages) = futures::join!(
        ctx.load(api.info(url)),
        ctx.load(api.stats(url)),
        ctx.load(api.packages(url))
    );

    let Some(repository) = repository else {
        return Ok(ExitCode::FAILURE);
    };

    if ctx.is_json() {
        print_json(&RepositoryReport {
            repository: &repository,
            stats: stats.as_deref(),
            packages: packages.as_deref(),
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    let theme = ctx.theme;
    print_repository_details(&repository, theme);

    header("Activity");
    match &stats {
        Some(stats) => render_overview(&ChartSeries::from_stats(stats), theme),
        None => println!("{}", theme.dim("unavailable")),
    }

    header("Packages");
    match &packages {
        Some(packages) if !packages.is_empty() => package_table(packages).print(),
        Some(_) => println!("{}", theme.dim("No packages")),
        None => println!("{}", theme.dim("unavailable")),
    }

    Ok(ExitCode::SUCCESS)
}

/// Comma-separated flags such as "fork, archived".
fn flags(repo: &Repository) -> String {
    let mut flags = Vec::new();
    if repo.is_fork {
        flags.push("fork");
    }
    if repo.is_template {
        flags.push("template");
    }
    if repo.archived_at.is_some() {
        flags.push("archived");
    }
    flags.join(", ")
}

fn print_repositories(ctx: &Context, page: &Page<Repository>) -> Result<()> {
    if ctx.is_json() {
        return print_json(page);
    }
    if page.is_empty() {
        println!("{}", style("No repositories found").dim());
        return Ok(());
    }

    let mut table = Table::new(&["Repository", "Stars", "Language", "Flags"]).numeric(1);
    for repo in &page.items {
        table.row([
            repo.url.clone(),
            format_count(repo.n_stars),
            or_dash(repo.primary_language.as_deref()),
            flags(repo),
        ]);
    }
    table.print();
    println!("{}", ctx.theme.dim(&page_footer(page)));
    Ok(())
}

fn print_repository_details(repo: &Repository, theme: Theme) {
    let colors = theme.colors_enabled;
    println!(
        "{} {}  {} {}",
        theme.package(&repo.name),
        theme.dim(&flags(repo)),
        theme.icon(Icon::Star),
        styled(format_count(repo.n_stars), Colors::number(), colors)
    );
    if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    println!();

    let topics = repo.topics.join(", ");
    let fields = [
        ("url", Some(repo.url.as_str())),
        ("language", repo.primary_language.as_deref()),
        ("license", repo.license.as_deref()),
        ("topics", Some(topics.as_str())),
        ("created", Some(repo.created_at.as_str())),
        ("updated", Some(repo.updated_at.as_str())),
        ("pushed", Some(repo.pushed_at.as_str())),
        ("archived", repo.archived_at.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            println!("  {:<9} {value}", theme.dim(label));
        }
    }
}

fn package_table(packages: &[PackageSource]) -> Table {
    let mut table = Table::new(&["Package", "Type"]);
    for source in packages {
        table.row([source.purl.clone(), source.kind.clone()]);
    }
    table
}

fn print_packages(ctx: &Context, packages: &[PackageSource]) -> Result<()> {
    if ctx.is_json() {
        return print_json(packages);
    }
    if packages.is_empty() {
        println!("{}", style("No packages").dim());
        return Ok(());
    }
    package_table(packages).print();
    println!("{}", ctx.theme.dim(&format!("{} total", packages.len())));
    Ok(())
}
