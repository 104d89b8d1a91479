//! Raw configuration values keyed by name.

use serde_json::{Map, Value};

use crate::error::{DingleError, Result};

/// Keys every dingle config must define.
pub const REQUIRED_KEYS: [&str; 9] = [
    "staging_dir",
    "yum_repo_host",
    "yum_dev_dir",
    "yum_qa_dir",
    "yum_stage_dir",
    "yum_prod_dir",
    "rpm_names",
    "prereq_repos",
    "list_of_repos",
];

/// The parsed config object before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigValues {
    values: Map<String, Value>,
}

impl ConfigValues {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| DingleError::MissingConfigValue {
                keys: vec![key.to_string()],
            })
    }

    /// The subset of `keys` that is absent, in the order given.
    pub fn missing_keys(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter(|k| !self.values.contains_key(**k))
            .map(|k| k.to_string())
            .collect()
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| DingleError::InvalidConfigType {
                key: key.to_string(),
                expected: "a string",
            })
    }

    pub fn get_str_list(&self, key: &str) -> Result<Vec<String>> {
        let invalid = || DingleError::InvalidConfigType {
            key: key.to_string(),
            expected: "a list of strings",
        };
        self.get(key)?
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
            .collect()
    }
}
