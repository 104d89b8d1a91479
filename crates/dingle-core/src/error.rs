//! Error types shared by every dingle-core operation.

use std::path::PathBuf;

use crate::promote::PromotionReport;
use crate::types::Tier;

/// Result alias used throughout dingle-core.
pub type Result<T> = std::result::Result<T, DingleError>;

#[derive(Debug, thiserror::Error)]
pub enum DingleError {
    /// A filename that does not follow `{name}-#.#.#-#.{arch}.rpm`.
    #[error("malformed artifact name '{filename}': {reason}")]
    MalformedArtifactName { filename: String, reason: String },

    #[error("config file does not exist: {}", .0.display())]
    MissingConfigFile(PathBuf),

    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("missing required config values: {}", keys.join(", "))]
    MissingConfigValue { keys: Vec<String> },

    #[error("config value '{key}' should be {expected}")]
    InvalidConfigType { key: String, expected: &'static str },

    #[error("tier '{0}' has no upstream tier to promote from")]
    NoUpstreamTier(Tier),

    #[error("unknown tier '{0}' (expected dev, qa, stage or prod)")]
    UnknownTier(String),

    #[error("remote command failed: {command}\n{output}")]
    RemoteCommandFailed { command: String, output: String },

    /// A promotion step failed; `report` holds every step run so far,
    /// the failed one last.
    #[error("update of {} failed: {cause}", report.tier)]
    PromotionFailed {
        report: Box<PromotionReport>,
        cause: Box<DingleError>,
    },

    #[error("failed to start {program}")]
    RemoteSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clone {repository}: {message}")]
    CloneFailure { repository: String, message: String },

    #[error("merge failed in {repository}: {message}")]
    MergeConflict { repository: String, message: String },

    #[error("git {args} failed: {message}")]
    GitCommandFailed { args: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DingleError {
    pub(crate) fn malformed(filename: &str, reason: impl Into<String>) -> Self {
        Self::MalformedArtifactName {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }

    /// The steps a failed promotion had already run.
    pub fn partial_report(&self) -> Option<&PromotionReport> {
        match self {
            Self::PromotionFailed { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Whether the error was caused by the caller rather than the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTier(_) | Self::NoUpstreamTier(_) | Self::MalformedArtifactName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_value_lists_every_key() {
        let err = DingleError::MissingConfigValue {
            keys: vec!["yum_qa_dir".to_string(), "rpm_names".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required config values: yum_qa_dir, rpm_names"
        );
    }

    #[test]
    fn caller_errors_are_classified() {
        assert!(DingleError::UnknownTier("uat".into()).is_caller_error());
        assert!(DingleError::NoUpstreamTier(Tier::Dev).is_caller_error());
        assert!(
            !DingleError::RemoteCommandFailed {
                command: "ls /x".into(),
                output: String::new(),
            }
            .is_caller_error()
        );
    }
}
