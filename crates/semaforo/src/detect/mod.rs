// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable object-detector boundary.
//!
//! The core never loads a model itself; it consumes [`Detector`]. The
//! synthetic implementation is the default; a real model backend plugs in
//! behind the same trait.

pub mod scripted;
pub mod synthetic;

use std::sync::Arc;

use image::RgbImage;

use crate::config::Config;
use crate::error::ModelError;

pub use scripted::ScriptedDetector;
pub use synthetic::SyntheticDetector;

/// Axis-aligned box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One raw detector output, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Object detector over single frames.
///
/// Implementations must be safe to call from a worker task. Inference may
/// block the calling worker; the supervisor instantiates one detector per
/// worker so no inference resource is shared.
pub trait Detector: Send + Sync {
    fn detect(&self, frame: &RgbImage) -> Result<Vec<Detection>, ModelError>;
}

/// Build one detector per camera from the configuration.
pub fn build_detectors(config: &Config) -> anyhow::Result<Vec<Arc<dyn Detector>>> {
    if config.use_detector {
        // The model is an external collaborator; no backend is compiled in.
        anyhow::bail!(
            "USE_DETECTOR=true but no detector backend is built into this binary; \
             run with the synthetic detector or link a model backend"
        );
    }
    Ok((0..crate::config::NUM_CAMERAS)
        .map(|camera_id| Arc::new(SyntheticDetector::new(camera_id as u64)) as Arc<dyn Detector>)
        .collect())
}
