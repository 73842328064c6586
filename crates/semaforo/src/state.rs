// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, NUM_CAMERAS};
use crate::detect::{self, Detector};
use crate::mailbox::FrameMailbox;
use crate::store::StateStore;
use crate::supervisor::Supervisor;

/// Shared application state.
///
/// Everything the source kept as module-level singletons is constructed
/// here once and passed around as a capability.
pub struct AppState {
    pub config: Config,
    pub store: Arc<StateStore>,
    pub mailboxes: Vec<Arc<FrameMailbox>>,
    /// One detector per camera; workers never share an inference handle.
    pub detectors: Vec<Arc<dyn Detector>>,
    pub supervisor: Supervisor,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, shutdown: CancellationToken) -> anyhow::Result<Arc<Self>> {
        let detectors = detect::build_detectors(&config)?;
        Ok(Self::with_detectors(config, detectors, shutdown))
    }

    /// Build with injected detectors (tests script their own).
    pub fn with_detectors(
        config: Config,
        detectors: Vec<Arc<dyn Detector>>,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let store = Arc::new(StateStore::new(config.thresholds()));
        let mailboxes = (0..NUM_CAMERAS).map(|_| Arc::new(FrameMailbox::new())).collect();
        Arc::new(Self {
            config,
            store,
            mailboxes,
            detectors,
            supervisor: Supervisor::new(),
            shutdown,
        })
    }
}
