//! Terminal charts for package and repository statistics.
//!
//! [`ChartSeries::from_stats`] turns backend records into plain series data;
//! the render functions only format that data.

use crate::output::colors::{Colors, styled};
use crate::output::table::Table;
use crate::output::{Theme, format_count};
use clap::ValueEnum;
use pkgdash_core::StatsRecord;

const SPARK_TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const ASCII_TICKS: [char; 8] = ['_', '.', '-', '~', '=', '+', '*', '#'];

/// One of the counted activity metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    Commits,
    Comments,
    Issues,
    Prs,
    Stars,
    Tags,
}

impl Metric {
    pub const ALL: [Self; 6] = [
        Self::Commits,
        Self::Comments,
        Self::Issues,
        Self::Prs,
        Self::Stars,
        Self::Tags,
    ];

    /// Position in [`StatsRecord::counts`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Comments => "comments",
            Self::Issues => "issues",
            Self::Prs => "PRs",
            Self::Stars => "stars",
            Self::Tags => "tags",
        }
    }
}

/// Stats windows laid out for charting, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: [Vec<u64>; 6],
}

impl ChartSeries {
    pub fn from_stats<S: StatsRecord>(records: &[S]) -> Self {
        let mut ordered: Vec<&S> = records.iter().collect();
        ordered.sort_by(|a, b| a.stats_from().cmp(b.stats_from()));

        let mut series = Self {
            labels: Vec::with_capacity(ordered.len()),
            values: Default::default(),
        };
        for record in ordered {
            series.labels.push(record.period());
            for (column, count) in series.values.iter_mut().zip(record.counts()) {
                column.push(count);
            }
        }
        series
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn metric(&self, metric: Metric) -> &[u64] {
        &self.values[metric.index()]
    }

    pub fn total(&self, metric: Metric) -> u64 {
        self.metric(metric).iter().sum()
    }

    pub fn latest(&self, metric: Metric) -> Option<u64> {
        self.metric(metric).last().copied()
    }
}

/// One tick per value, scaled to the series maximum.
pub fn sparkline(values: &[u64], unicode: bool) -> String {
    let ticks = if unicode { SPARK_TICKS } else { ASCII_TICKS };
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            if max == 0 {
                ticks[0]
            } else {
                let idx = (v * (ticks.len() as u64 - 1)).div_ceil(max);
                ticks[idx as usize]
            }
        })
        .collect()
}

/// Horizontal bars, one line per label, scaled so the maximum fills `width`.
pub fn bar_lines(labels: &[String], values: &[u64], width: usize, unicode: bool) -> Vec<String> {
    let fill = if unicode { '█' } else { '#' };
    let max = values.iter().copied().max().unwrap_or(0);
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    labels
        .iter()
        .zip(values)
        .map(|(label, &value)| {
            let len = if max == 0 {
                0
            } else {
                ((value as f64 / max as f64) * width as f64).round() as usize
            };
            let bar: String = std::iter::repeat_n(fill, len).collect();
            format!("{label:>label_width$} {bar} {}", format_count(value))
        })
        .collect()
}

/// Print every metric as a sparkline row with totals.
pub fn render_overview(series: &ChartSeries, theme: Theme) {
    if series.is_empty() {
        println!("{}", theme.dim("No statistics recorded"));
        return;
    }
    let mut table = Table::new(&["Metric", "Trend", "Total", "Latest"])
        .numeric(2)
        .numeric(3);
    for metric in Metric::ALL {
        let spark = sparkline(series.metric(metric), theme.unicode_enabled);
        table.row([
            metric.label().to_string(),
            styled(spark, Colors::series(metric.index()), theme.colors_enabled),
            format_count(series.total(metric)),
            series.latest(metric).map(format_count).unwrap_or_default(),
        ]);
    }
    table.print();

    if let (Some(first), Some(last)) = (series.labels.first(), series.labels.last()) {
        println!(
            "{}",
            theme.dim(&format!("{} windows, {first} to {last}", series.len()))
        );
    }
}

/// Print one metric as a bar chart.
pub fn render_metric(series: &ChartSeries, metric: Metric, theme: Theme) {
    if series.is_empty() {
        println!("{}", theme.dim("No statistics recorded"));
        return;
    }
    println!("{}", theme.header(metric.label()));
    let width = console::Term::stdout()
        .size_checked()
        .map_or(40, |(_, cols)| usize::from(cols).saturating_sub(30).clamp(10, 60));
    for line in bar_lines(&series.labels, series.metric(metric), width, theme.unicode_enabled) {
        println!(
            "{}",
            styled(line, Colors::series(metric.index()), theme.colors_enabled)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgdash_core::{RepositoryStats, StatsInterval};

    fn stats(from: &str, commits: u64, stars: u64) -> RepositoryStats {
        RepositoryStats {
            url: "https://github.com/curl/curl".into(),
            stats_from: from.into(),
            stats_interval: StatsInterval::Month,
            n_commits: commits,
            n_comments: 0,
            n_issues: 1,
            n_prs: 2,
            n_stars: stars,
            n_tags: 0,
            hits: None,
            hits_rank_pct: None,
            hits_zscore: None,
            record_created_at: None,
            record_updated_at: None,
        }
    }

    #[test]
    fn series_is_ordered_by_window_start() {
        let series = ChartSeries::from_stats(&[
            stats("2024-03-01T00:00:00", 30, 3),
            stats("2024-01-01T00:00:00", 10, 1),
            stats("2024-02-01T00:00:00", 20, 2),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(series.metric(Metric::Commits), &[10, 20, 30]);
        assert_eq!(series.metric(Metric::Stars), &[1, 2, 3]);
        assert_eq!(series.total(Metric::Prs), 6);
        assert_eq!(series.latest(Metric::Commits), Some(30));
    }

    #[test]
    fn empty_series() {
        let series = ChartSeries::from_stats::<RepositoryStats>(&[]);
        assert!(series.is_empty());
        assert_eq!(series.latest(Metric::Tags), None);
        assert_eq!(series.total(Metric::Tags), 0);
    }

    #[test]
    fn metric_order_matches_counts() {
        let record = stats("2024-01-01T00:00:00", 7, 9);
        let counts = record.counts();
        assert_eq!(counts[Metric::Commits.index()], 7);
        assert_eq!(counts[Metric::Stars.index()], 9);
        assert_eq!(counts[Metric::Prs.index()], 2);
    }

    #[test]
    fn sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0, 4, 8], true), "▁▅█");
        assert_eq!(sparkline(&[0, 0], true), "▁▁");
        assert_eq!(sparkline(&[1, 7], false), ".#");
        assert_eq!(sparkline(&[], true), "");
    }

    #[test]
    fn bars_scale_to_width() {
        let labels = vec!["2024-01".to_string(), "2024-02".to_string()];
        let lines = bar_lines(&labels, &[5, 10], 10, false);
        assert_eq!(lines[0], "2024-01 ##### 5");
        assert_eq!(lines[1], "2024-02 ########## 10");
    }

    #[test]
    fn bars_with_all_zero_values() {
        let labels = vec!["a".to_string()];
        assert_eq!(bar_lines(&labels, &[0], 10, true), vec!["a  0"]);
    }
}
