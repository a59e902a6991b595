//! Payload shapes returned by the pkgdash backend.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Page number (1-based).
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size.
    #[serde(default)]
    pub size: Option<u64>,
    /// Number of pages.
    #[serde(default)]
    pub pages: Option<u64>,
}

impl<T> Page<T> {
    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        match (self.page, self.pages) {
            (Some(page), Some(pages)) => page < pages,
            _ => false,
        }
    }
}

/// A software package (rpm/npm/maven/...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub purl: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub source_purl: Option<String>,
    #[serde(default)]
    pub distro: Option<String>,
    #[serde(default)]
    pub distro_release: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub source_pid: Option<String>,
    #[serde(default)]
    pub record_created_at: Option<String>,
    #[serde(default)]
    pub record_updated_at: Option<String>,
}

/// A dependency edge between two packages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDependency {
    pub purl: String,
    #[serde(default)]
    pub pkgid: Option<i64>,
    pub dep_purl: String,
    #[serde(default)]
    pub dep_pkgid: Option<i64>,
    /// Dependency kind as reported by the ecosystem (e.g. `requires`).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub dep_at: Option<String>,
}

/// Link from a package to the source repository it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSource {
    pub purl: String,
    pub repo_url: String,
    /// How the link was established.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sourced_at: Option<String>,
    /// Confidence of the link, 0.0 to 1.0.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Risk signals collected for a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageAlert {
    #[serde(rename = "_id")]
    pub id: String,
    pub purl: String,
    pub repo_url: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub commit_sha: Option<String>,
    /// Vulnerability identifiers (OSV/CVE).
    #[serde(default)]
    pub vulns: Vec<String>,
    #[serde(default)]
    pub n_contributors: Option<u64>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    /// Share of compatible licenses, `0.0..=1.0`.
    #[serde(default)]
    pub license_compatibility: Option<f64>,
    pub record_created_at: String,
    pub record_updated_at: String,
}

impl PackageAlert {
    /// Whether any alert is raised at all. Unknown signals raise nothing.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.vulns.is_empty()
            || self.is_archived == Some(true)
            || self.license_compatibility.is_some_and(|ratio| ratio < 1.0)
    }
}

/// Aggregation window of a statistics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatsInterval {
    Day,
    Week,
    Month,
    Year,
}

impl StatsInterval {
    /// Render the start of a window as a short period label.
    ///
    /// Falls back to the raw text when the timestamp cannot be parsed.
    #[must_use]
    pub fn label(self, stats_from: &str) -> String {
        let Some(date) = parse_date(stats_from) else {
            return stats_from.to_string();
        };
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Year => date.format("%Y").to_string(),
        }
    }
}

impl fmt::Display for StatsInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        };
        f.write_str(s)
    }
}

impl FromStr for StatsInterval {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(crate::Error::UnknownInterval(s.to_string())),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Activity statistics of a package over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageStats {
    pub url: String,
    pub stats_from: String,
    pub stats_interval: StatsInterval,
    pub n_commits: u64,
    pub n_comments: u64,
    pub n_issues: u64,
    pub n_prs: u64,
    pub n_stars: u64,
    pub n_tags: u64,
    #[serde(default)]
    pub pagerank: Option<f64>,
    #[serde(default)]
    pub record_created_at: Option<String>,
    #[serde(default)]
    pub record_updated_at: Option<String>,
}

/// Activity statistics of a repository over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub url: String,
    pub stats_from: String,
    pub stats_interval: StatsInterval,
    pub n_commits: u64,
    pub n_comments: u64,
    pub n_issues: u64,
    pub n_prs: u64,
    pub n_stars: u64,
    pub n_tags: u64,
    #[serde(default)]
    pub hits: Option<f64>,
    #[serde(default)]
    pub hits_rank_pct: Option<f64>,
    #[serde(default)]
    pub hits_zscore: Option<f64>,
    #[serde(default)]
    pub record_created_at: Option<String>,
    #[serde(default)]
    pub record_updated_at: Option<String>,
}

/// Common view over package and repository statistics.
pub trait StatsRecord {
    /// Window start, as sent by the backend.
    fn stats_from(&self) -> &str;
    /// Window length.
    fn interval(&self) -> StatsInterval;
    /// Counts in chart order: commits, comments, issues, PRs, stars, tags.
    fn counts(&self) -> [u64; 6];

    /// Short label for the window.
    fn period(&self) -> String {
        self.interval().label(self.stats_from())
    }
}

macro_rules! impl_stats_record {
    ($ty:ty) => {
        impl StatsRecord for $ty {
            fn stats_from(&self) -> &str {
                &self.stats_from
            }

            fn interval(&self) -> StatsInterval {
                self.stats_interval
            }

            fn counts(&self) -> [u64; 6] {
                [
                    self.n_commits,
                    self.n_comments,
                    self.n_issues,
                    self.n_prs,
                    self.n_stars,
                    self.n_tags,
                ]
            }
        }
    };
}

impl_stats_record!(PackageStats);
impl_stats_record!(RepositoryStats);

/// A source repository on a code-hosting site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub url: String,
    pub name: String,
    pub n_stars: u64,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,
    #[serde(default)]
    pub archived_at: Option<String>,
    pub is_template: bool,
    pub is_fork: bool,
    #[serde(default)]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub record_created_at: Option<String>,
    #[serde(default)]
    pub record_updated_at: Option<String>,
}

/// One segment of a validation error location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationPart {
    Index(i64),
    Key(String),
}

impl fmt::Display for LocationPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// Where in the request a validation error occurred, e.g. `query,page`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location(pub Vec<LocationPart>);

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<LocationPart>),
            One(LocationPart),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(parts) => Self(parts),
            OneOrMany::One(part) => Self(vec![part]),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// Request validation failure reported with HTTP 422.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub loc: Location,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc, self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_location_joins_with_comma() {
        let err: ValidationError =
            sonic_rs::from_str(r#"{"loc":["query","page"],"msg":"invalid"}"#).unwrap();
        assert_eq!(err.to_string(), "query,page: invalid");
    }

    #[test]
    fn validation_error_mixed_location() {
        let err: ValidationError = sonic_rs::from_str(
            r#"{"loc":["body","items",2],"msg":"field required","type":"value_error.missing"}"#,
        )
        .unwrap();
        assert_eq!(err.to_string(), "body,items,2: field required");
        assert_eq!(err.kind.as_deref(), Some("value_error.missing"));
    }

    #[test]
    fn validation_error_scalar_location() {
        let err: ValidationError = sonic_rs::from_str(r#"{"loc":"purl","msg":"bad"}"#).unwrap();
        assert_eq!(err.to_string(), "purl: bad");
    }

    #[test]
    fn page_navigation() {
        let page: Page<String> =
            sonic_rs::from_str(r#"{"items":["a"],"total":3,"page":1,"size":1,"pages":3}"#)
                .unwrap();
        assert!(page.has_next());
        assert!(!page.is_empty());

        let last: Page<String> = sonic_rs::from_str(r#"{"items":[],"total":0}"#).unwrap();
        assert!(!last.has_next());
        assert!(last.is_empty());
    }

    #[test]
    fn package_optional_fields_default() {
        let pkg: Package =
            sonic_rs::from_str(r#"{"purl":"pkg:rpm/fedora/curl","name":"curl"}"#).unwrap();
        assert_eq!(pkg.name, "curl");
        assert!(pkg.version.is_none());
        assert!(pkg.distro.is_none());
    }

    #[test]
    fn interval_labels() {
        let raw = "2023-07-02T08:08:09.513451";
        assert_eq!(StatsInterval::Day.label(raw), "2023-07-02");
        assert_eq!(StatsInterval::Week.label(raw), "2023-W26");
        assert_eq!(StatsInterval::Month.label(raw), "2023-07");
        assert_eq!(StatsInterval::Year.label("2021-01-01T00:00:00Z"), "2021");
        assert_eq!(StatsInterval::Month.label("not a date"), "not a date");
    }

    #[test]
    fn interval_from_str() {
        assert_eq!("week".parse::<StatsInterval>().unwrap(), StatsInterval::Week);
        assert!("fortnight".parse::<StatsInterval>().is_err());
    }

    #[test]
    fn stats_record_counts_in_chart_order() {
        let stats = RepositoryStats {
            url: "https://github.com/curl/curl".into(),
            stats_from: "2023-01-01T00:00:00".into(),
            stats_interval: StatsInterval::Month,
            n_commits: 1,
            n_comments: 2,
            n_issues: 3,
            n_prs: 4,
            n_stars: 5,
            n_tags: 6,
            hits: None,
            hits_rank_pct: None,
            hits_zscore: None,
            record_created_at: None,
            record_updated_at: None,
        };
        assert_eq!(stats.counts(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(stats.period(), "2023-01");
    }

    #[test]
    fn alert_findings() {
        let alert: PackageAlert = sonic_rs::from_str(
            r#"{"_id":"1","purl":"pkg:npm/x","repo_url":"u","name":"x","version":"1",
                "commit_sha":"abc","vulns":[],"n_contributors":3,"is_archived":false,
                "license_compatibility":1.0,"record_created_at":"t","record_updated_at":"t"}"#,
        )
        .unwrap();
        assert!(!alert.has_findings());
        assert_eq!(alert.commit_sha.as_deref(), Some("abc"));
        assert_eq!(alert.n_contributors, Some(3));
    }

    #[test]
    fn alert_with_unknown_signals() {
        let alert: PackageAlert = sonic_rs::from_str(
            r#"{"_id":"1","purl":"pkg:npm/x","repo_url":"u","name":"x","version":"1",
                "commit_sha":null,"vulns":[],"n_contributors":null,"is_archived":null,
                "license_compatibility":null,"record_created_at":"t","record_updated_at":"t"}"#,
        )
        .unwrap();
        assert_eq!(alert.commit_sha, None);
        assert_eq!(alert.n_contributors, None);
        assert_eq!(alert.is_archived, None);
        assert_eq!(alert.license_compatibility, None);
        assert!(!alert.has_findings());
    }

    #[test]
    fn alert_findings_from_signals() {
        let alert: PackageAlert = sonic_rs::from_str(
            r#"{"_id":"1","purl":"pkg:npm/x","repo_url":"u","name":"x","version":"1",
                "vulns":[],"is_archived":true,"license_compatibility":0,
                "record_created_at":"t","record_updated_at":"t"}"#,
        )
        .unwrap();
        assert_eq!(alert.license_compatibility, Some(0.0));
        assert!(alert.has_findings());
    }

    #[test]
    fn repository_stats_with_fractional_hits() {
        let stats: RepositoryStats = sonic_rs::from_str(
            r#"{"url":"https://github.com/curl/curl","stats_from":"2024-01-01T00:00:00",
                "stats_interval":"Month","n_commits":10,"n_comments":2,"n_issues":3,
                "n_prs":4,"n_stars":50,"n_tags":1,"hits":0.0123,
                "hits_rank_pct":0.98,"hits_zscore":2.5}"#,
        )
        .unwrap();
        assert_eq!(stats.hits, Some(0.0123));
        assert_eq!(stats.counts(), [10, 2, 3, 4, 50, 1]);
    }
}
