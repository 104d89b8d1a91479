//! Promotion of artifacts from one tier to the next.
//!
//! A promotion into qa, stage or prod runs, strictly in order:
//! 1. diff the upstream and target listings and keep the latest new artifacts
//! 2. drop anything on the skip list
//! 3. copy the survivors in one command
//! 4. refresh the target's yum metadata
//! 5. reset ownership of the target tree
//!
//! An empty selection stops after step 2. Any failed step aborts the rest
//! and hands back the steps run so far; files already copied stay where
//! they are.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DingleConfig;
use crate::diff::{DiffResult, latest_of_diff, new_artifacts};
use crate::error::{DingleError, Result};
use crate::listing::TierLister;
use crate::remote::{RemoteCommand, RemoteExecutor};
use crate::skip::filter_rpms;
use crate::types::Tier;
use crate::version::latest_per_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Copy,
    RefreshMetadata,
    Chown,
}

/// One remote command run during a promotion and what it reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    pub kind: StepKind,
    pub command: String,
    pub succeeded: bool,
    pub output: String,
}

/// Outcome of a successful promotion.
#[derive(Debug, Clone, Serialize)]
pub struct PromotionReport {
    pub tier: Tier,
    /// Artifacts copied into the tier, sorted by filename.
    pub promoted: Vec<String>,
    pub steps: Vec<ExecutionStep>,
    pub started_at: DateTime<Utc>,
}

impl PromotionReport {
    /// True when nothing was run on the host.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn failed_step(&self) -> Option<&ExecutionStep> {
        self.steps.iter().find(|step| !step.succeeded)
    }
}

/// Drives listings and promotions for every tier against one host.
pub struct Promoter<'a, E: RemoteExecutor + ?Sized> {
    config: &'a DingleConfig,
    remote: &'a E,
}

impl<'a, E: RemoteExecutor + ?Sized> Promoter<'a, E> {
    pub fn new(config: &'a DingleConfig, remote: &'a E) -> Self {
        Self { config, remote }
    }

    fn lister(&self) -> TierLister<'a, E> {
        TierLister::new(self.config, self.remote)
    }

    /// Raw directory listing of `tier`.
    pub fn list_fs(&self, tier: Tier) -> Result<Vec<String>> {
        self.lister().list_fs(tier)
    }

    /// Artifact files in `tier`.
    pub fn artifacts(&self, tier: Tier) -> Result<Vec<String>> {
        self.lister().artifacts(tier)
    }

    /// Diff between `tier` and the tier it promotes from.
    pub fn tier_diff(&self, tier: Tier) -> Result<DiffResult> {
        let upstream = tier.upstream().ok_or(DingleError::NoUpstreamTier(tier))?;
        let lister = self.lister();
        new_artifacts(|| lister.artifacts(upstream), || lister.artifacts(tier))
    }

    /// The artifacts a promotion into `tier` would copy, sorted by filename.
    ///
    /// Dev has nothing upstream, so for dev this is the latest version of
    /// each artifact already there.
    pub fn latest_new_rpms<K: AsRef<str>>(&self, tier: Tier, skips: &[K]) -> Result<Vec<String>> {
        let latest = match tier.upstream() {
            Some(_) => latest_of_diff(&self.tier_diff(tier)?),
            None => latest_per_name(&self.artifacts(tier)?),
        };
        Ok(filter_rpms(&latest, skips))
    }

    /// Update `tier`'s repository.
    ///
    /// For dev there is nothing to copy; the metadata refresh and ownership
    /// reset always run. A failed step ends the update with
    /// [`DingleError::PromotionFailed`], which carries the steps run so far.
    pub fn promote<K: AsRef<str>>(&self, tier: Tier, skips: &[K]) -> Result<PromotionReport> {
        let started_at = Utc::now();
        let dest = self.config.tier_dir(tier);
        let mut report = PromotionReport {
            tier,
            promoted: Vec::new(),
            steps: Vec::new(),
            started_at,
        };

        let mut plan = Vec::with_capacity(3);
        let mut selected = Vec::new();
        if let Some(upstream) = tier.upstream() {
            selected = self.latest_new_rpms(tier, skips)?;
            if selected.is_empty() {
                info!(%tier, "no new artifacts to promote");
                return Ok(report);
            }
            info!(%tier, count = selected.len(), "promoting from {}", upstream);
            let source = self.config.tier_dir(upstream);
            plan.push((StepKind::Copy, RemoteCommand::copy_files(&selected, source, dest)));
        }
        plan.push((StepKind::RefreshMetadata, RemoteCommand::refresh_metadata(dest)));
        plan.push((
            StepKind::Chown,
            RemoteCommand::chown(dest, tier.owner_group(), true),
        ));

        for (kind, command) in plan {
            if let Err(cause) = self.run_step(&mut report, kind, command) {
                return Err(DingleError::PromotionFailed {
                    report: Box::new(report),
                    cause: Box::new(cause),
                });
            }
            if kind == StepKind::Copy {
                report.promoted = std::mem::take(&mut selected);
            }
        }

        Ok(report)
    }

    fn run_step(
        &self,
        report: &mut PromotionReport,
        kind: StepKind,
        command: RemoteCommand,
    ) -> Result<()> {
        let shell = command.to_shell();
        info!(tier = %report.tier, "running {}", shell);
        let result = self.remote.run(&command)?;

        report.steps.push(ExecutionStep {
            kind,
            command: shell.clone(),
            succeeded: result.succeeded,
            output: result.output.clone(),
        });

        if !result.succeeded {
            warn!(tier = %report.tier, "step failed: {}", shell);
            return Err(DingleError::RemoteCommandFailed {
                command: shell,
                output: result.output,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
