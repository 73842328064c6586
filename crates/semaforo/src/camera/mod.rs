// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Camera worker: the per-approach capture, detect, annotate, publish loop.

pub mod annotate;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::detect::{BoundingBox, Detector};
use crate::error::CameraError;
use crate::mailbox::FrameMailbox;
use crate::source::{self, FrameSource};
use crate::store::{CameraState, StateStore};
use crate::vehicle::{normalize_label, ClassCounts, VehicleClass};

/// Per-worker knobs, copied out of the global config at spawn.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub confidence_threshold: f32,
    pub frame_interval: Duration,
    /// Frames to average counts over; 1 = instantaneous.
    pub count_smoothing: usize,
}

/// One camera worker. Exclusively owns its video source and its row of the
/// state store.
pub struct CameraWorker {
    pub camera_id: usize,
    source_spec: String,
    detector: Arc<dyn Detector>,
    store: Arc<StateStore>,
    mailbox: Arc<FrameMailbox>,
    settings: WorkerSettings,
    cancel: CancellationToken,
}

impl CameraWorker {
    pub fn new(
        camera_id: usize,
        source_spec: String,
        detector: Arc<dyn Detector>,
        store: Arc<StateStore>,
        mailbox: Arc<FrameMailbox>,
        settings: WorkerSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self { camera_id, source_spec, detector, store, mailbox, settings, cancel }
    }

    /// Spawn the worker loop. A worker that dies marks only its own camera
    /// degraded; the rest of the system continues.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let camera_id = self.camera_id;
            let store = Arc::clone(&self.store);
            match self.run().await {
                Ok(()) => debug!(camera = camera_id, "camera worker stopped"),
                Err(e) => {
                    warn!(camera = camera_id, err = %e, "camera worker terminated");
                    store.mark_degraded(camera_id);
                }
            }
        })
    }

    async fn run(self) -> Result<(), CameraError> {
        let mut source = source::open(&self.source_spec)?;
        let mut window = SmoothingWindow::new(self.settings.count_smoothing);

        let mut ticker = tokio::time::interval(self.settings.frame_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        debug!(camera = self.camera_id, source = %self.source_spec, "camera worker started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(mut frame) = next_frame(source.as_mut(), self.camera_id)? else {
                continue;
            };

            let detections = match self.detector.detect(&frame) {
                Ok(d) => d,
                Err(e) => {
                    // Single-frame failure: counts stay untouched.
                    warn!(camera = self.camera_id, err = %e, "skipping frame");
                    continue;
                }
            };

            let mut counts = ClassCounts::default();
            let mut boxes: Vec<(VehicleClass, BoundingBox)> = Vec::new();
            for detection in detections {
                if detection.confidence < self.settings.confidence_threshold {
                    continue;
                }
                if let Some(class) = normalize_label(&detection.label) {
                    counts.increment(class);
                    boxes.push((class, detection.bbox));
                }
            }
            let published = window.push(counts);

            annotate::draw_overlays(&mut frame, &boxes, &counts);
            match annotate::encode_jpeg(&frame) {
                Ok(jpeg) => self.mailbox.publish(jpeg),
                // Skip publishing this frame; counts still update.
                Err(e) => warn!(camera = self.camera_id, err = %e, "frame encode failed"),
            }

            self.store.update(self.camera_id, CameraState::from_counts(self.camera_id, published));
        }

        Ok(())
    }
}

/// Read one frame, rewinding on end-of-stream and once on a read error.
/// A failed rewind propagates and terminates the worker.
fn next_frame(
    source: &mut dyn FrameSource,
    camera_id: usize,
) -> Result<Option<image::RgbImage>, CameraError> {
    match source.read_frame() {
        Ok(Some(frame)) => Ok(Some(frame)),
        Ok(None) => {
            debug!(camera = camera_id, "end of stream, rewinding");
            source.rewind()?;
            Ok(None)
        }
        Err(e) => {
            warn!(camera = camera_id, err = %e, "frame read failed, rewinding");
            source.rewind()?;
            Ok(None)
        }
    }
}

/// Rolling element-wise mean of the last N frames' counts.
struct SmoothingWindow {
    capacity: usize,
    window: VecDeque<ClassCounts>,
}

impl SmoothingWindow {
    fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), window: VecDeque::new() }
    }

    fn push(&mut self, counts: ClassCounts) -> ClassCounts {
        if self.capacity == 1 {
            return counts;
        }
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(counts);

        let n = self.window.len() as u32;
        // Round half up so a lone vehicle is not smoothed away.
        let mean = |class: VehicleClass| {
            let sum: u32 = self.window.iter().map(|c| c.get(class)).sum();
            (sum + n / 2) / n
        };
        ClassCounts {
            car: mean(VehicleClass::Car),
            truck: mean(VehicleClass::Truck),
            bus: mean(VehicleClass::Bus),
            ambulance: mean(VehicleClass::Ambulance),
            mototaxi: mean(VehicleClass::Mototaxi),
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
