//! Commands run against the yum repository host.
//!
//! Operations are built as [`RemoteCommand`] values and only rendered to a
//! shell string at the transport boundary, so executors can be swapped
//! between real ssh ([`SshExecutor`]) and an in-memory host ([`MemoryRemote`]).

mod memory;
mod ssh;

use std::fmt;

use serde::Serialize;

use crate::error::Result;

pub use memory::MemoryRemote;
pub use ssh::{SshExecutor, SshTarget};

/// A single operation against the repository host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum RemoteCommand {
    /// Plain (non-long) directory listing.
    ListDir { path: String },
    /// Copy every source into `dest` in one invocation.
    CopyFiles { sources: Vec<String>, dest: String },
    /// Regenerate yum metadata for a repository directory.
    RefreshMetadata { path: String },
    Chown {
        path: String,
        owner_group: String,
        recursive: bool,
    },
}

impl RemoteCommand {
    pub fn list_dir(path: impl Into<String>) -> Self {
        Self::ListDir { path: path.into() }
    }

    /// Copy `filenames` from directory `source` into directory `dest`.
    pub fn copy_files<S: AsRef<str>>(filenames: &[S], source: &str, dest: &str) -> Self {
        Self::CopyFiles {
            sources: filenames
                .iter()
                .map(|f| join_remote_path(source, f.as_ref()))
                .collect(),
            dest: dest.to_string(),
        }
    }

    pub fn refresh_metadata(path: impl Into<String>) -> Self {
        Self::RefreshMetadata { path: path.into() }
    }

    pub fn chown(path: impl Into<String>, owner_group: impl Into<String>, recursive: bool) -> Self {
        Self::Chown {
            path: path.into(),
            owner_group: owner_group.into(),
            recursive,
        }
    }

    /// Whether the command modifies the repository tree and must run as root.
    pub fn needs_privilege(&self) -> bool {
        !matches!(self, Self::ListDir { .. })
    }

    /// Render as a POSIX shell command line.
    pub fn to_shell(&self) -> String {
        match self {
            Self::ListDir { path } => format!("ls {}", shell_quote(path)),
            Self::CopyFiles { sources, dest } => {
                let mut parts = vec!["cp".to_string()];
                parts.extend(sources.iter().map(|s| shell_quote(s)));
                parts.push(shell_quote(dest));
                parts.join(" ")
            }
            Self::RefreshMetadata { path } => {
                format!("createrepo --update {}", shell_quote(path))
            }
            Self::Chown {
                path,
                owner_group,
                recursive,
            } => {
                let flag = if *recursive { " -R" } else { "" };
                format!(
                    "chown{} {} {}",
                    flag,
                    shell_quote(owner_group),
                    shell_quote(path)
                )
            }
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}

/// What an executor reports back for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub succeeded: bool,
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: output.into(),
        }
    }
}

/// Runs [`RemoteCommand`]s on the repository host.
///
/// A command that ran and failed is `Ok` with `succeeded == false`; `Err` is
/// reserved for not being able to reach the host at all. Implementations
/// are not required to serialize concurrent callers.
pub trait RemoteExecutor: Send + Sync {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput>;
}

pub(crate) fn join_remote_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        return name.to_string();
    }
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Single-quote `value` unless it only contains characters the shell leaves alone.
pub fn shell_quote(value: &str) -> String {
    let is_plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@=,".contains(c));
    if is_plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
