//! Git operations for cutting a drop.
//!
//! Repositories are cloned into a local staging directory, `dev` is merged
//! into `master` and pushed, and `master` is tagged. This is independent of
//! the promotion engine and only shares the config with it.

mod ops;

pub use ops::{GitOps, dir_from_repo};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Which configured list of repositories to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSet {
    /// `prereq_repos`
    Prereqs,
    /// `list_of_repos`
    Repos,
}

impl RepoSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSet::Prereqs => "prereqs",
            RepoSet::Repos => "repos",
        }
    }
}

impl fmt::Display for RepoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prereqs" => Ok(RepoSet::Prereqs),
            "repos" => Ok(RepoSet::Repos),
            _ => Err(format!("Invalid repo set: '{}'. Use 'prereqs' or 'repos'", s)),
        }
    }
}
