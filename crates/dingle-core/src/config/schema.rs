//! Validated dingle configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::values::{ConfigValues, REQUIRED_KEYS};
use crate::error::{DingleError, Result};
use crate::git::RepoSet;
use crate::types::Tier;

/// Everything dingle needs to know about the repository host and git repos.
///
/// Built once at start-up and passed by reference to every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DingleConfig {
    /// Local directory used to clone repositories for merge and tag.
    pub staging_dir: PathBuf,
    /// Default ssh target for remote commands.
    pub yum_repo_host: String,
    pub yum_dev_dir: String,
    pub yum_qa_dir: String,
    pub yum_stage_dir: String,
    pub yum_prod_dir: String,
    pub rpm_names: Vec<String>,
    pub prereq_repos: Vec<String>,
    pub list_of_repos: Vec<String>,
}

impl DingleConfig {
    /// Repository directory for `tier` on the repo host.
    pub fn tier_dir(&self, tier: Tier) -> &str {
        match tier {
            Tier::Dev => &self.yum_dev_dir,
            Tier::Qa => &self.yum_qa_dir,
            Tier::Stage => &self.yum_stage_dir,
            Tier::Prod => &self.yum_prod_dir,
        }
    }

    pub fn repos(&self, set: RepoSet) -> &[String] {
        match set {
            RepoSet::Prereqs => &self.prereq_repos,
            RepoSet::Repos => &self.list_of_repos,
        }
    }
}

#[cfg(test)]
impl DingleConfig {
    pub(crate) fn for_tests() -> Self {
        Self {
            staging_dir: "/tmp/staging".into(),
            yum_repo_host: "repo".into(),
            yum_dev_dir: "/rpms/dev".into(),
            yum_qa_dir: "/rpms/qa".into(),
            yum_stage_dir: "/rpms/stage".into(),
            yum_prod_dir: "/rpms/prod".into(),
            rpm_names: Vec::new(),
            prereq_repos: Vec::new(),
            list_of_repos: Vec::new(),
        }
    }
}

impl ConfigValues {
    /// Check presence of every required key, then their types.
    ///
    /// All missing keys are reported together; type errors stop at the first.
    pub fn validate(&self) -> Result<DingleConfig> {
        let missing = self.missing_keys(&REQUIRED_KEYS);
        if !missing.is_empty() {
            return Err(DingleError::MissingConfigValue { keys: missing });
        }

        Ok(DingleConfig {
            staging_dir: PathBuf::from(self.get_str("staging_dir")?),
            yum_repo_host: self.get_str("yum_repo_host")?.to_string(),
            yum_dev_dir: self.get_str("yum_dev_dir")?.to_string(),
            yum_qa_dir: self.get_str("yum_qa_dir")?.to_string(),
            yum_stage_dir: self.get_str("yum_stage_dir")?.to_string(),
            yum_prod_dir: self.get_str("yum_prod_dir")?.to_string(),
            rpm_names: self.get_str_list("rpm_names")?,
            prereq_repos: self.get_str_list("prereq_repos")?,
            list_of_repos: self.get_str_list("list_of_repos")?,
        })
    }
}
