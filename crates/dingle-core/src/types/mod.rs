//! Shared core types used across configuration and promotion layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DingleError;

/// Environment tier in the promotion chain.
///
/// Artifacts flow `Dev -> Qa -> Stage -> Prod`; each tier is one yum
/// repository directory on the repo host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Where the build system drops freshly built packages.
    Dev,
    Qa,
    Stage,
    Prod,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Dev, Tier::Qa, Tier::Stage, Tier::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Dev => "dev",
            Tier::Qa => "qa",
            Tier::Stage => "stage",
            Tier::Prod => "prod",
        }
    }

    /// The tier this one receives artifacts from.
    pub fn upstream(&self) -> Option<Tier> {
        match self {
            Tier::Dev => None,
            Tier::Qa => Some(Tier::Dev),
            Tier::Stage => Some(Tier::Qa),
            Tier::Prod => Some(Tier::Stage),
        }
    }

    /// Owner and group applied to the tier's repository tree after an update.
    pub fn owner_group(&self) -> &'static str {
        match self {
            Tier::Dev => "buildnanny:www",
            Tier::Qa | Tier::Stage | Tier::Prod => "root:www",
        }
    }

    /// Config key holding the tier's repository directory.
    pub fn config_key(&self) -> &'static str {
        match self {
            Tier::Dev => "yum_dev_dir",
            Tier::Qa => "yum_qa_dir",
            Tier::Stage => "yum_stage_dir",
            Tier::Prod => "yum_prod_dir",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DingleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Tier::Dev),
            "qa" => Ok(Tier::Qa),
            "stage" => Ok(Tier::Stage),
            "prod" => Ok(Tier::Prod),
            _ => Err(DingleError::UnknownTier(s.to_string())),
        }
    }
}
