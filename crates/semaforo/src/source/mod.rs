// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Video sources for camera workers.
//!
//! A source spec is an opaque string: `synthetic:<seed>` yields a
//! procedurally generated feed, anything else is treated as a loopable
//! MJPEG file. Network ingestion (RTSP) lives behind the same trait in an
//! external backend.

pub mod mjpeg;
pub mod synthetic;

use image::RgbImage;

use crate::error::CameraError;

pub use mjpeg::MjpegFileSource;
pub use synthetic::SyntheticSource;

/// Sequential frame producer owned by exactly one camera worker.
pub trait FrameSource: Send {
    /// Next decoded frame; `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CameraError>;

    /// Seek back to the first frame.
    fn rewind(&mut self) -> Result<(), CameraError>;
}

/// Open a source from its spec string.
pub fn open(spec: &str) -> Result<Box<dyn FrameSource>, CameraError> {
    if let Some(seed) = spec.strip_prefix("synthetic:") {
        let seed = seed
            .parse::<u64>()
            .map_err(|_| CameraError::Source(format!("bad synthetic seed in {spec:?}")))?;
        return Ok(Box::new(SyntheticSource::new(seed)));
    }
    Ok(Box::new(MjpegFileSource::open(spec)?))
}
