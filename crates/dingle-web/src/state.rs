//! Shared state for the HTTP handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dingle_core::config::DingleConfig;
use dingle_core::remote::RemoteExecutor;
use dingle_core::types::Tier;

/// One lock per tier so that at most one update of a tier runs at a time.
///
/// Listings never take a lock.
#[derive(Debug, Default)]
pub struct TierLocks {
    dev: Mutex<()>,
    qa: Mutex<()>,
    stage: Mutex<()>,
    prod: Mutex<()>,
}

impl TierLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, tier: Tier) -> &Mutex<()> {
        match tier {
            Tier::Dev => &self.dev,
            Tier::Qa => &self.qa,
            Tier::Stage => &self.stage,
            Tier::Prod => &self.prod,
        }
    }

    /// Block until `tier` is free and hold it while the guard lives.
    pub fn hold(&self, tier: Tier) -> MutexGuard<'_, ()> {
        self.lock_for(tier)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a request needs: the loaded config, the executor for the
/// repository host and the per-tier update locks.
pub struct AppState {
    pub config: DingleConfig,
    pub executor: Arc<dyn RemoteExecutor>,
    pub locks: TierLocks,
}

impl AppState {
    pub fn new(config: DingleConfig, executor: Arc<dyn RemoteExecutor>) -> Self {
        Self {
            config,
            executor,
            locks: TierLocks::new(),
        }
    }
}
