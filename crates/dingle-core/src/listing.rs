//! Tier directory listings on the repository host.

use tracing::debug;

use crate::config::DingleConfig;
use crate::error::{DingleError, Result};
use crate::remote::{RemoteCommand, RemoteExecutor};
use crate::types::Tier;
use crate::version::ARTIFACT_EXTENSION;

/// Flatten plain `ls` output into one entry per whitespace-separated token.
pub fn split_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

/// Keep only artifact files, preserving order.
pub fn artifact_entries<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.as_ref().ends_with(ARTIFACT_EXTENSION))
        .map(|e| e.as_ref().to_string())
        .collect()
}

/// Lists tier directories through a [`RemoteExecutor`].
pub struct TierLister<'a, E: RemoteExecutor + ?Sized> {
    config: &'a DingleConfig,
    remote: &'a E,
}

impl<'a, E: RemoteExecutor + ?Sized> TierLister<'a, E> {
    pub fn new(config: &'a DingleConfig, remote: &'a E) -> Self {
        Self { config, remote }
    }

    /// Every entry in the tier's directory.
    pub fn list_fs(&self, tier: Tier) -> Result<Vec<String>> {
        let command = RemoteCommand::list_dir(self.config.tier_dir(tier));
        let result = self.remote.run(&command)?;
        if !result.succeeded {
            return Err(DingleError::RemoteCommandFailed {
                command: command.to_shell(),
                output: result.output,
            });
        }
        let entries = split_listing(&result.output);
        debug!(%tier, entries = entries.len(), "listed tier directory");
        Ok(entries)
    }

    /// Artifact files in the tier's directory.
    pub fn artifacts(&self, tier: Tier) -> Result<Vec<String>> {
        self.list_fs(tier).map(|entries| artifact_entries(&entries))
    }
}
