// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted detector — a test double fed per-class counts from outside.

use parking_lot::Mutex;

use image::RgbImage;

use crate::error::ModelError;
use crate::vehicle::{ClassCounts, VehicleClass};

use super::{BoundingBox, Detection, Detector};

/// Emits detections matching whatever counts the test last [`set`].
///
/// [`set`]: ScriptedDetector::set
#[derive(Default)]
pub struct ScriptedDetector {
    current: Mutex<ClassCounts>,
    fail_next: Mutex<bool>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the counts every subsequent frame reports.
    pub fn set(&self, counts: ClassCounts) {
        *self.current.lock() = counts;
    }

    /// Make the next `detect` call fail with a `ModelError`.
    pub fn fail_next(&self) {
        *self.fail_next.lock() = true;
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, frame: &RgbImage) -> Result<Vec<Detection>, ModelError> {
        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(ModelError("scripted failure".into()));
        }

        let counts = *self.current.lock();
        let (w, h) = (frame.width().max(1) as f32, frame.height().max(1) as f32);

        let mut detections = Vec::new();
        let mut slot = 0u32;
        for class in VehicleClass::ALL {
            for _ in 0..counts.get(class) {
                let col = (slot % 4) as f32;
                let row = (slot / 4) as f32;
                slot += 1;
                let bw = w / 5.0;
                let bh = h / 5.0;
                detections.push(Detection {
                    label: class.as_str().to_owned(),
                    confidence: 0.95,
                    bbox: BoundingBox {
                        x1: col * bw,
                        y1: row * bh,
                        x2: col * bw + bw,
                        y2: row * bh + bh,
                    },
                });
            }
        }
        Ok(detections)
    }
}
