//! Version ordering and latest-version selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use super::model::{Artifact, VersionTuple};
use crate::error::Result;

pub fn compare(a: &VersionTuple, b: &VersionTuple) -> Ordering {
    a.cmp(b)
}

/// Sort filenames ascending by version. Equal versions fall back to the
/// filename so the output does not depend on input order.
pub fn sort_by_version<S: AsRef<str>>(filenames: &[S]) -> Result<Vec<String>> {
    let mut artifacts = filenames
        .iter()
        .map(|f| Artifact::parse(f.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    artifacts.sort_by(|a, b| {
        compare(&a.version, &b.version).then_with(|| a.filename.cmp(&b.filename))
    });
    Ok(artifacts.into_iter().map(|a| a.filename).collect())
}

/// The highest-versioned filename for each artifact name, sorted by filename.
///
/// Malformed filenames are logged and left out.
pub fn latest_per_name<S: AsRef<str>>(filenames: &[S]) -> Vec<String> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for filename in filenames {
        match Artifact::parse(filename.as_ref()) {
            Ok(artifact) => groups
                .entry(artifact.name)
                .or_default()
                .push(artifact.filename),
            Err(err) => warn!("skipping {}: {}", filename.as_ref(), err),
        }
    }

    let mut latest: Vec<String> = groups
        .into_values()
        .filter_map(|group| {
            // Every member already parsed above.
            sort_by_version(&group).ok().and_then(|mut sorted| sorted.pop())
        })
        .collect();
    latest.sort();
    latest
}

/// Whether any candidate with the same name as `filename` has a strictly
/// greater version. Fails only when `filename` itself is malformed.
pub fn has_later_version<S: AsRef<str>>(filename: &str, candidates: &[S]) -> Result<bool> {
    let subject = Artifact::parse(filename)?;
    Ok(candidates.iter().any(|candidate| {
        match Artifact::parse(candidate.as_ref()) {
            Ok(other) => other.name == subject.name && other.version > subject.version,
            Err(err) => {
                warn!("ignoring candidate {}: {}", candidate.as_ref(), err);
                false
            }
        }
    }))
}
