//! Filename-level version model for repository artifacts.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::{DingleError, Result};

/// Suffix shared by every artifact file in a tier directory.
pub const ARTIFACT_EXTENSION: &str = ".rpm";

/// One field of a version tuple.
///
/// All-digit fields are numeric so `10 > 9`; anything else is kept verbatim.
/// Every `Numeric` orders before every `Text`, which keeps the ordering total
/// when a name fragment leaks into a version field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum VersionComponent {
    Numeric(i64),
    Text(String),
}

impl VersionComponent {
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Digit runs longer than i64 stay textual rather than failing.
            if let Ok(n) = raw.parse::<i64>() {
                return VersionComponent::Numeric(n);
            }
        }
        VersionComponent::Text(raw.to_string())
    }
}

impl Ord for VersionComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        use VersionComponent::{Numeric, Text};
        match (self, other) {
            (Numeric(a), Numeric(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Numeric(_), Text(_)) => Ordering::Less,
            (Text(_), Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for VersionComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionComponent::Numeric(n) => write!(f, "{n}"),
            VersionComponent::Text(s) => f.write_str(s),
        }
    }
}

/// `[major, minor, patch, release]`, compared position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VersionTuple(pub [VersionComponent; 4]);

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch, release] = &self.0;
        write!(f, "{major}.{minor}.{patch}-{release}")
    }
}

/// A parsed artifact filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub filename: String,
    pub name: String,
    pub version: VersionTuple,
}

impl Artifact {
    pub fn parse(filename: &str) -> Result<Self> {
        let (name, version) = split_filename(filename)?;
        Ok(Self {
            filename: filename.to_string(),
            name,
            version,
        })
    }
}

/// Parse the four-part version out of an artifact filename.
pub fn parse_version(filename: &str) -> Result<VersionTuple> {
    split_filename(filename).map(|(_, version)| version)
}

/// The artifact name: every dash segment before the trailing version and
/// release pair, so `iplant-clavin-1.0.0-10.noarch.rpm` is `iplant-clavin`.
pub fn parse_name(filename: &str) -> Result<String> {
    split_filename(filename).map(|(name, _)| name)
}

fn split_filename(filename: &str) -> Result<(String, VersionTuple)> {
    let stem = filename.strip_suffix(ARTIFACT_EXTENSION).unwrap_or(filename);

    let mut segments: Vec<&str> = stem.split('-').collect();
    if segments.len() < 2 {
        return Err(DingleError::malformed(
            filename,
            "expected '<version>-<release>' after the name",
        ));
    }
    let release_segment = segments.pop().unwrap_or_default();
    let version_segment = segments.pop().unwrap_or_default();

    let fields: Vec<&str> = version_segment.split('.').collect();
    let [major, minor, patch] = fields.as_slice() else {
        return Err(DingleError::malformed(
            filename,
            format!(
                "version '{version_segment}' has {} fields, expected 3",
                fields.len()
            ),
        ));
    };
    // "10.noarch" -> "10"; the architecture is not part of the version.
    let release = release_segment.split('.').next().unwrap_or_default();

    let version = VersionTuple([
        VersionComponent::parse(major),
        VersionComponent::parse(minor),
        VersionComponent::parse(patch),
        VersionComponent::parse(release),
    ]);
    Ok((segments.join("-"), version))
}
