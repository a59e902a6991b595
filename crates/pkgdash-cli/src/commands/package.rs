//! Package commands.

use super::{PageArgs, finished, or_dash, print_json};
use crate::chart::{ChartSeries, Metric, render_metric, render_overview};
use crate::context::Context;
use crate::output::colors::{Colors, styled};
use crate::output::table::Table;
use crate::output::{Icon, Theme, format_count, header};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::style;
use pkgdash_core::{
    Package, PackageAlert, PackageDependency, PackageSource, PackageStats, Page, Purl,
};
use serde::Serialize;
use std::process::ExitCode;
use tracing::info;

/// Arguments for the package command.
#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub command: PackageCommand,
}

#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    /// List packages
    List(PageArgs),

    /// Search packages by purl regular expression
    Search {
        /// Regular expression matched against purls
        regex: String,

        /// Only packages from these distros (repeatable)
        #[arg(short, long = "distro", value_name = "DISTRO")]
        distros: Vec<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a package with its sources, alerts and activity
    Show { purl: String },

    /// Activity statistics of a package's source repository
    Stats {
        purl: String,

        /// Chart a single metric instead of the overview
        #[arg(long, value_enum)]
        metric: Option<Metric>,
    },

    /// Direct dependencies
    Deps { purl: String },

    /// Transitive dependencies
    #[command(name = "tdeps")]
    TransitiveDeps { purl: String },

    /// Packages that depend on this one
    #[command(name = "rdeps")]
    Dependents { purl: String },

    /// Health alerts
    Alerts { purl: String },

    /// Source repositories
    Sources { purl: String },

    /// Known distros
    Distros,
}

/// Everything `package show` gathers, for JSON output.
#[derive(Debug, Serialize)]
struct PackageReport<'a> {
    package: &'a Package,
    sources: Option<&'a [PackageSource]>,
    alerts: Option<&'a PackageAlert>,
    stats: Option<&'a [PackageStats]>,
}

/// Validate a purl before sending it to the backend.
fn parse_purl(raw: &str) -> Result<Purl> {
    Purl::parse(raw).with_context(|| format!("invalid package URL '{raw}'"))
}

/// Run the package command.
pub async fn run(args: &PackageArgs, ctx: &Context) -> Result<ExitCode> {
    let api = ctx.client.packages();
    match &args.command {
        PackageCommand::List(page) => {
            let result = ctx.load(api.list(page.page, page.size)).await;
            finished(result, |page| print_packages(ctx, &page))
        }
        PackageCommand::Search {
            regex,
            distros,
            page,
        } => {
            info!(regex = %regex, distros = ?distros, "searching packages");
            let result = ctx
                .load(api.search(regex, distros, page.page, page.size))
                .await;
            finished(result, |page| print_packages(ctx, &page))
        }
        PackageCommand::Show { purl } => show(ctx, &parse_purl(purl)?).await,
        PackageCommand::Stats { purl, metric } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.stats(&purl)).await;
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
        PackageCommand::Deps { purl } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.dependencies(&purl)).await;
            finished(result, |deps| print_dependencies(ctx, &deps, false))
        }
        PackageCommand::TransitiveDeps { purl } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.transitive_dependencies(&purl)).await;
            finished(result, |deps| print_dependencies(ctx, &deps, false))
        }
        PackageCommand::Dependents { purl } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.dependents(&purl)).await;
            finished(result, |deps| print_dependencies(ctx, &deps, true))
        }
        PackageCommand::Alerts { purl } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.alerts(&purl)).await;
            finished(result, |alert| {
                if ctx.is_json() {
                    return print_json(&alert);
                }
                print_alert(&alert, ctx.theme);
                Ok(())
            })
        }
        PackageCommand::Sources { purl } => {
            let purl = parse_purl(purl)?.to_string();
            let result = ctx.load(api.sources(&purl)).await;
            finished(result, |sources| print_sources(ctx, &sources))
        }
        PackageCommand::Distros => {
            let result = ctx.load(api.distros()).await;
            finished(result, |distros| {
                if ctx.is_json() {
                    return print_json(&distros);
                }
                for distro in distros {
                    println!("{distro}");
                }
                Ok(())
            })
        }
    }
}

/// Fetch the package and its related records concurrently.
///
/// All four requests share the context's coordinator, so one spinner covers
/// the batch. Only the package itself is required.
async fn show(ctx: &Context, purl: &Purl) -> Result<ExitCode> {
    let api = ctx.client.packages();
    let purl = purl.to_string();
    let (package, sources, alerts, stats) = futures::join!(
        ctx.load(api.info(&purl)),
        ctx.load(api.sources(&purl)),
        ctx.load(api.alerts(&purl)),
        ctx.load(api.stats(&purl))
    );

    let Some(package) = package else {
        return Ok(ExitCode::FAILURE);
    };

    if ctx.is_json() {
        print_json(&PackageReport {
            package: &package,
            sources: sources.as_deref(),
            alerts: alerts.as_ref(),
            stats: stats.as_deref(),
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    let theme = ctx.theme;
    print_package_details(&package, theme);

    header("Sources");
    match &sources {
        Some(sources) if !sources.is_empty() => source_table(sources).print(),
        Some(_) => println!("{}", theme.dim("No source repositories")),
        None => println!("{}", theme.dim("unavailable")),
    }

    header("Alerts");
    match &alerts {
        Some(alert) => print_alert(alert, theme),
        None => println!("{}", theme.dim("unavailable")),
    }

    header("Activity");
    match &stats {
        Some(stats) => render_overview(&ChartSeries::from_stats(stats), theme),
        None => println!("{}", theme.dim("unavailable")),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_packages(ctx: &Context, page: &Page<Package>) -> Result<()> {
    if ctx.is_json() {
        return print_json(page);
    }
    if page.is_empty() {
        println!("{}", style("No packages found").dim());
        return Ok(());
    }

    let mut table = if ctx.is_verbose() {
        Table::new(&["Package", "Version", "Distro", "Arch", "License"])
    } else {
        Table::new(&["Package", "Version", "Distro"])
    };
    for pkg in &page.items {
        let distro = match (pkg.distro.as_deref(), pkg.distro_release.as_deref()) {
            (Some(d), Some(r)) => format!("{d} {r}"),
            (d, _) => or_dash(d),
        };
        let mut row = vec![pkg.purl.clone(), or_dash(pkg.version.as_deref()), distro];
        if ctx.is_verbose() {
            row.push(or_dash(pkg.arch.as_deref()));
            row.push(or_dash(pkg.license.as_deref()));
        }
        table.row(row);
    }
    table.print();
    println!("{}", ctx.theme.dim(&page_footer(page)));
    Ok(())
}

/// "Showing 1-20 of 123 (page 1 of 7)".
pub(crate) fn page_footer<T>(page: &Page<T>) -> String {
    let count = page.items.len() as u64;
    match (page.page, page.size) {
        (Some(number), Some(size)) if number > 0 => {
            let first = (number - 1) * size + 1;
            let mut text = format!(
                "Showing {first}-{} of {}",
                first + count.saturating_sub(1),
                format_count(page.total)
            );
            if let Some(pages) = page.pages {
                text.push_str(&format!(" (page {number} of {pages})"));
            }
            text
        }
        _ => format!("Showing {count} of {}", format_count(page.total)),
    }
}

fn print_package_details(pkg: &Package, theme: Theme) {
    let title = match &pkg.version {
        Some(version) => format!("{} {}", theme.package(&pkg.name), theme.version(version)),
        None => theme.package(&pkg.name),
    };
    println!("{} {title}", theme.icon(Icon::Package));
    if let Some(summary) = pkg.summary.as_deref().filter(|s| !s.is_empty()) {
        println!("  {summary}");
    }

    let fields = [
        ("purl", Some(pkg.purl.as_str())),
        ("license", pkg.license.as_deref()),
        ("distro", pkg.distro.as_deref()),
        ("release", pkg.distro_release.as_deref()),
        ("arch", pkg.arch.as_deref()),
        ("homepage", pkg.homepage_url.as_deref()),
        ("repository", pkg.repo_url.as_deref()),
        ("source", pkg.source_purl.as_deref()),
    ];
    println!();
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let value = if label == "homepage" || label == "repository" {
                theme.url(value)
            } else {
                value.to_string()
            };
            println!("  {:<11} {value}", theme.dim(label));
        }
    }
}

fn print_dependencies(ctx: &Context, deps: &[PackageDependency], reverse: bool) -> Result<()> {
    if ctx.is_json() {
        return print_json(deps);
    }
    if deps.is_empty() {
        println!("{}", style("No dependencies found").dim());
        return Ok(());
    }

    let mut table = Table::new(&[if reverse { "Dependent" } else { "Dependency" }, "Type", "Constraint"]);
    for dep in deps {
        let other = if reverse { &dep.purl } else { &dep.dep_purl };
        table.row([other.clone(), dep.kind.clone(), or_dash(dep.constraint.as_deref())]);
    }
    table.print();
    println!("{}", ctx.theme.dim(&format!("{} total", deps.len())));
    Ok(())
}

fn source_table(sources: &[PackageSource]) -> Table {
    let mut table = Table::new(&["Repository", "Type", "Confidence"]).numeric(2);
    for source in sources {
        table.row([
            source.repo_url.clone(),
            source.kind.clone(),
            source
                .confidence
                .map(|c| format!("{:.0}%", c * 100.0))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

fn print_sources(ctx: &Context, sources: &[PackageSource]) -> Result<()> {
    if ctx.is_json() {
        return print_json(sources);
    }
    if sources.is_empty() {
        println!("{}", style("No source repositories").dim());
        return Ok(());
    }
    source_table(sources).print();
    Ok(())
}

fn print_alert(alert: &PackageAlert, theme: Theme) {
    let colors = theme.colors_enabled;
    let status = if alert.has_findings() {
        styled(
            format!("{} needs attention", theme.icon(Icon::Warning)),
            Colors::critical(),
            colors,
        )
    } else {
        styled(
            format!("{} no findings", theme.icon(Icon::Security)),
            Colors::ok(),
            colors,
        )
    };
    println!("{status}");
    println!("  {:<22} {}", theme.dim("repository"), theme.url(&alert.repo_url));
    for (label, value) in alert_fields(alert, theme) {
        println!("  {:<22} {}", theme.dim(label), value);
    }
    if !alert.vulns.is_empty() {
        println!("  {}", theme.dim("vulnerabilities"));
        for vuln in &alert.vulns {
            println!(
                "    {} {}",
                theme.icon(Icon::Bullet),
                styled(vuln, Colors::critical(), colors)
            );
        }
    }
}

/// Label/value lines of an alert summary. Signals the backend has not
/// collected render as `-`.
fn alert_fields(alert: &PackageAlert, theme: Theme) -> Vec<(&'static str, String)> {
    let colors = theme.colors_enabled;
    let contributors = alert.n_contributors.map_or_else(
        || "-".to_string(),
        |n| styled(format_count(n), Colors::number(), colors),
    );
    let archived = match alert.is_archived {
        Some(true) => styled("yes", Colors::critical(), colors),
        Some(false) => "no".to_string(),
        None => "-".to_string(),
    };
    let compatibility = alert.license_compatibility.map_or_else(
        || "-".to_string(),
        |ratio| styled(format!("{:.0}%", ratio * 100.0), Colors::ratio(ratio), colors),
    );
    vec![
        ("commit", or_dash(alert.commit_sha.as_deref())),
        ("contributors", contributors),
        ("archived", archived),
        ("license compatibility", compatibility),
    ]
}
