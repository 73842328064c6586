// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle supervisor: starts and stops the camera workers and the
//! signal controller as a group.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::camera::{CameraWorker, WorkerSettings};
use crate::signal::plan::Timings;
use crate::signal::SignalController;
use crate::state::AppState;
use crate::store::LightsState;

/// Bounded wait for workers to finish after cancellation.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// A running processing group: all workers plus the controller.
struct RunningGroup {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

/// Serializes start/stop; at most one processing group runs at a time.
#[derive(Default)]
pub struct Supervisor {
    running: Mutex<Option<RunningGroup>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Start processing. Returns false if already running.
    pub async fn start(&self, app: &Arc<AppState>) -> bool {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return false;
        }

        app.store.reset_rows();
        let cancel = app.shutdown.child_token();

        let settings = WorkerSettings {
            confidence_threshold: app.config.confidence_threshold,
            frame_interval: app.config.frame_interval(),
            count_smoothing: app.config.count_smoothing,
        };

        let mut handles = Vec::new();
        for (camera_id, spec) in app.config.video_paths().into_iter().enumerate() {
            let worker = CameraWorker::new(
                camera_id,
                spec.to_owned(),
                Arc::clone(&app.detectors[camera_id]),
                Arc::clone(&app.store),
                Arc::clone(&app.mailboxes[camera_id]),
                settings.clone(),
                cancel.clone(),
            );
            handles.push(worker.spawn());
        }

        let controller = SignalController::new(
            Arc::clone(&app.store),
            Timings::from_config(&app.config),
            cancel.clone(),
        );
        handles.push(controller.spawn());

        app.store.set_processing(true);
        info!(cameras = handles.len() - 1, "processing started");

        *running = Some(RunningGroup { cancel, handles });
        true
    }

    /// Stop processing, wait for the group to wind down, and reset the
    /// lights to all-red. Returns false if not running.
    pub async fn stop(&self, app: &Arc<AppState>) -> bool {
        let group = match self.running.lock().await.take() {
            Some(group) => group,
            None => return false,
        };

        group.cancel.cancel();
        for handle in group.handles {
            if tokio::time::timeout(STOP_TIMEOUT, handle).await.is_err() {
                warn!("worker did not stop within {STOP_TIMEOUT:?}");
            }
        }

        // Counts freeze at their last values; the lights fail safe.
        app.store.set_processing(false);
        app.store.set_lights(LightsState::all_red());
        app.store.set_emergency(crate::store::EmergencyState::inactive());
        for mailbox in &app.mailboxes {
            mailbox.clear();
        }
        info!("processing stopped");
        true
    }

    /// Flip processing and return the new state.
    pub async fn toggle(&self, app: &Arc<AppState>) -> bool {
        if self.is_running().await {
            self.stop(app).await;
            false
        } else {
            self.start(app).await;
            true
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
