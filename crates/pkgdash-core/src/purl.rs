//! Package URL (purl) parsing.
//!
//! Purls identify a package across ecosystems:
//! `pkg:type/namespace/name@version?qualifiers#subpath`.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SCHEME: &str = "pkg:";

/// A parsed package URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Purl {
    ty: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
    qualifiers: Vec<(String, String)>,
    subpath: Option<String>,
}

impl Purl {
    /// Parse a purl string.
    ///
    /// `%40` is accepted in place of `@`, the same normalisation the backend
    /// applies before lookups.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().replace("%40", "@");
        let Some(rest) = normalized.strip_prefix(SCHEME) else {
            return Err(Error::purl(input, "missing 'pkg:' scheme"));
        };
        let rest = rest.trim_start_matches('/');

        let (rest, subpath) = match rest.split_once('#') {
            Some((head, sub)) => (head, non_empty(sub.trim_matches('/'))),
            None => (rest, None),
        };

        let (rest, qualifiers) = match rest.split_once('?') {
            Some((head, query)) => (head, parse_qualifiers(query)),
            None => (rest, Vec::new()),
        };

        // The version separator is the first '@' after the last path segment
        // boundary; scoped npm namespaces carry an '@' of their own.
        let name_start = rest.rfind('/').map_or(0, |i| i + 1);
        let (path, version) = match rest[name_start..].find('@') {
            Some(at) => {
                let at = name_start + at;
                (&rest[..at], non_empty(&rest[at + 1..]))
            }
            None => (rest, None),
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let ty = segments
            .next()
            .ok_or_else(|| Error::purl(input, "missing package type"))?
            .to_ascii_lowercase();
        let mut segments: Vec<&str> = segments.collect();
        let name = segments
            .pop()
            .ok_or_else(|| Error::purl(input, "missing package name"))?
            .to_string();
        let namespace = if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        };

        Ok(Self {
            ty,
            namespace,
            name,
            version,
            qualifiers,
            subpath,
        })
    }

    /// Package type (ecosystem), e.g. `rpm`, `npm`, `maven`.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Namespace, if any (vendor, scope, group id or distro).
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Qualifier value by key.
    #[must_use]
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Subpath, if any.
    #[must_use]
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Name including namespace, without version.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Purl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.ty, self.full_name())?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        for (i, (key, value)) in self.qualifiers.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "#{subpath}")?;
        }
        Ok(())
    }
}

impl FromStr for Purl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Purl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Purl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_qualifiers(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), value.to_string()))
        })
        .collect();
    pairs.sort();
    pairs
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rpm_purl() {
        let purl = Purl::parse("pkg:rpm/fedora/curl@7.50.3-1.fc25?arch=i386&distro=fedora-25")
            .unwrap();
        assert_eq!(purl.ty(), "rpm");
        assert_eq!(purl.namespace(), Some("fedora"));
        assert_eq!(purl.name(), "curl");
        assert_eq!(purl.version(), Some("7.50.3-1.fc25"));
        assert_eq!(purl.qualifier("arch"), Some("i386"));
        assert_eq!(purl.qualifier("distro"), Some("fedora-25"));
    }

    #[test]
    fn parse_scoped_npm() {
        let purl = Purl::parse("pkg:npm/%40angular/animation@12.3.1").unwrap();
        assert_eq!(purl.namespace(), Some("@angular"));
        assert_eq!(purl.name(), "animation");
        assert_eq!(purl.version(), Some("12.3.1"));

        let unversioned = Purl::parse("pkg:npm/@angular/animation").unwrap();
        assert_eq!(unversioned.namespace(), Some("@angular"));
        assert_eq!(unversioned.version(), None);
    }

    #[test]
    fn parse_without_namespace() {
        let purl = Purl::parse("pkg:pypi/django@1.11.1").unwrap();
        assert_eq!(purl.namespace(), None);
        assert_eq!(purl.full_name(), "django");
    }

    #[test]
    fn parse_subpath() {
        let purl = Purl::parse("pkg:golang/google.golang.org/genproto#googleapis/api").unwrap();
        assert_eq!(purl.namespace(), Some("google.golang.org"));
        assert_eq!(purl.name(), "genproto");
        assert_eq!(purl.subpath(), Some("googleapis/api"));
    }

    #[test]
    fn reject_malformed() {
        assert!(matches!(
            Purl::parse("npm/left-pad"),
            Err(Error::InvalidPurl { .. })
        ));
        assert!(Purl::parse("pkg:").is_err());
        assert!(Purl::parse("pkg:npm").is_err());
    }

    #[test]
    fn display_is_canonical() {
        let purl = Purl::parse("pkg:RPM/fedora/curl@7.50?distro=f25&arch=i386").unwrap();
        assert_eq!(
            purl.to_string(),
            "pkg:rpm/fedora/curl@7.50?arch=i386&distro=f25"
        );
    }
}
