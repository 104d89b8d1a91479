//! In-memory repository host.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{CommandOutput, RemoteCommand, RemoteExecutor};
use crate::error::Result;

#[derive(Debug, Default)]
struct HostState {
    dirs: BTreeMap<String, Vec<String>>,
    history: Vec<RemoteCommand>,
    failing: HashSet<&'static str>,
}

/// Directory tree and command log kept in memory.
///
/// Listings come from the stored directories, copies update them, and
/// metadata refreshes and ownership changes succeed without effect. Every
/// command is recorded in order.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<HostState>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `dir` with `entries`, replacing whatever was there.
    pub fn with_dir<S: AsRef<str>>(self, dir: &str, entries: &[S]) -> Self {
        self.lock().dirs.insert(
            normalize(dir),
            entries.iter().map(|e| e.as_ref().to_string()).collect(),
        );
        self
    }

    /// Make every command with the given verb report failure.
    ///
    /// Verbs: `list_dir`, `copy_files`, `refresh_metadata`, `chown`.
    pub fn failing(self, verb: &'static str) -> Self {
        self.lock().failing.insert(verb);
        self
    }

    pub fn entries(&self, dir: &str) -> Vec<String> {
        self.lock().dirs.get(&normalize(dir)).cloned().unwrap_or_default()
    }

    /// Every command run so far.
    pub fn history(&self) -> Vec<RemoteCommand> {
        self.lock().history.clone()
    }

    /// Commands run so far that modify the host.
    pub fn mutations(&self) -> Vec<RemoteCommand> {
        self.lock()
            .history
            .iter()
            .filter(|c| c.needs_privilege())
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteExecutor for MemoryRemote {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        let mut state = self.lock();
        state.history.push(command.clone());

        let verb = verb(command);
        if state.failing.contains(verb) {
            return Ok(CommandOutput::failure(format!("{verb}: simulated failure")));
        }

        match command {
            RemoteCommand::ListDir { path } => match state.dirs.get(&normalize(path)) {
                Some(entries) => Ok(CommandOutput::success(entries.join("\n"))),
                None => Ok(CommandOutput::failure(format!(
                    "ls: cannot access '{path}': No such file or directory"
                ))),
            },
            RemoteCommand::CopyFiles { sources, dest } => {
                let mut copied = Vec::new();
                for source in sources {
                    let (dir, name) = source.rsplit_once('/').unwrap_or(("", source));
                    let exists = state
                        .dirs
                        .get(&normalize(dir))
                        .is_some_and(|entries| entries.iter().any(|e| e == name));
                    if !exists {
                        return Ok(CommandOutput::failure(format!(
                            "cp: cannot stat '{source}': No such file or directory"
                        )));
                    }
                    copied.push(name.to_string());
                }
                let target = state.dirs.entry(normalize(dest)).or_default();
                for name in copied {
                    if !target.contains(&name) {
                        target.push(name);
                    }
                }
                Ok(CommandOutput::success(""))
            }
            RemoteCommand::RefreshMetadata { .. } | RemoteCommand::Chown { .. } => {
                Ok(CommandOutput::success(""))
            }
        }
    }
}

fn verb(command: &RemoteCommand) -> &'static str {
    match command {
        RemoteCommand::ListDir { .. } => "list_dir",
        RemoteCommand::CopyFiles { .. } => "copy_files",
        RemoteCommand::RefreshMetadata { .. } => "refresh_metadata",
        RemoteCommand::Chown { .. } => "chown",
    }
}

fn normalize(dir: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() && dir.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
