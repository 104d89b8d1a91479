//! Dingle Core Library
//!
//! Provides the domain logic for promoting RPM artifacts through the
//! dev, qa, stage and prod yum repositories, and for merging and tagging
//! the source repositories that produce them.

pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod listing;
pub mod promote;
pub mod remote;
pub mod skip;
pub mod types;
pub mod version;

pub use error::{DingleError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, ConfigValues, DingleConfig};

    // Errors
    pub use crate::error::{DingleError, Result};

    // Promotion
    pub use crate::diff::DiffResult;
    pub use crate::promote::{ExecutionStep, PromotionReport, Promoter, StepKind};
    pub use crate::types::Tier;

    // Remote execution
    pub use crate::remote::{
        CommandOutput, MemoryRemote, RemoteCommand, RemoteExecutor, SshExecutor, SshTarget,
    };

    // Git
    pub use crate::git::{GitOps, RepoSet};

    // Versions
    pub use crate::version::{Artifact, VersionTuple};
}
