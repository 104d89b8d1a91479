//! What is new at a tier boundary.
//!
//! Every boundary (dev→qa, qa→stage, stage→prod) goes through the same two
//! functions; callers pick the boundary by supplying the listers.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::version::has_later_version;

/// Upstream and downstream listings plus the filenames only upstream has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// `upstream - downstream` by exact filename, sorted and de-duplicated.
    pub new_set: Vec<String>,
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
}

pub fn diff(upstream: Vec<String>, downstream: Vec<String>) -> DiffResult {
    let present: BTreeSet<&str> = downstream.iter().map(String::as_str).collect();
    let new_set: BTreeSet<&str> = upstream
        .iter()
        .map(String::as_str)
        .filter(|f| !present.contains(f))
        .collect();
    let new_set = new_set.into_iter().map(str::to_string).collect();

    DiffResult {
        new_set,
        upstream,
        downstream,
    }
}

/// Run both listers and diff the results.
pub fn new_artifacts<U, D>(upstream: U, downstream: D) -> Result<DiffResult>
where
    U: FnOnce() -> Result<Vec<String>>,
    D: FnOnce() -> Result<Vec<String>>,
{
    let upstream = upstream()?;
    let downstream = downstream()?;
    let result = diff(upstream, downstream);
    debug!(
        upstream = result.upstream.len(),
        downstream = result.downstream.len(),
        new = result.new_set.len(),
        "computed tier diff"
    );
    Ok(result)
}

/// New upstream artifacts that are the newest of their name both among the
/// downstream listing and among the other new artifacts.
///
/// Malformed filenames in the new set are logged and dropped.
pub fn latest_new<U, D>(upstream: U, downstream: D) -> Result<Vec<String>>
where
    U: FnOnce() -> Result<Vec<String>>,
    D: FnOnce() -> Result<Vec<String>>,
{
    let result = new_artifacts(upstream, downstream)?;
    Ok(latest_of_diff(&result))
}

/// The `latest_new` selection applied to an already computed diff.
pub fn latest_of_diff(result: &DiffResult) -> Vec<String> {
    result
        .new_set
        .iter()
        .filter(|candidate| {
            let superseded = has_later_version(candidate, &result.downstream).and_then(|later| {
                if later {
                    Ok(true)
                } else {
                    has_later_version(candidate, &result.new_set)
                }
            });
            match superseded {
                Ok(superseded) => !superseded,
                Err(err) => {
                    warn!("excluding {}: {}", candidate, err);
                    false
                }
            }
        })
        .cloned()
        .collect()
}
