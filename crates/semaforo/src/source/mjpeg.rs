// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loopable MJPEG file source.
//!
//! An MJPEG file is a concatenation of JPEG images. Frames are located by
//! scanning for SOI/EOI markers once at open, then decoded on demand.

use image::RgbImage;

use crate::error::CameraError;

use super::FrameSource;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Reads a whole MJPEG file into memory and serves its frames in order,
/// rewinding to the first frame on request.
pub struct MjpegFileSource {
    data: Vec<u8>,
    frames: Vec<(usize, usize)>,
    cursor: usize,
}

impl MjpegFileSource {
    pub fn open(path: &str) -> Result<Self, CameraError> {
        let data = std::fs::read(path)
            .map_err(|e| CameraError::Source(format!("open {path:?}: {e}")))?;
        let frames = scan_frames(&data);
        if frames.is_empty() {
            return Err(CameraError::Source(format!("no JPEG frames in {path:?}")));
        }
        Ok(Self { data, frames, cursor: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MjpegFileSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CameraError> {
        let Some(&(start, end)) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        let img = image::load_from_memory(&self.data[start..end])
            .map_err(|e| CameraError::Source(format!("decode frame {}: {e}", self.cursor - 1)))?;
        Ok(Some(img.to_rgb8()))
    }

    fn rewind(&mut self) -> Result<(), CameraError> {
        self.cursor = 0;
        Ok(())
    }
}

/// Locate `(start, end)` byte ranges of each JPEG in the buffer.
fn scan_frames(data: &[u8]) -> Vec<(usize, usize)> {
    let mut frames = Vec::new();
    let mut start = None;
    let mut i = 0;
    while i + 1 < data.len() {
        let pair = [data[i], data[i + 1]];
        if pair == SOI && start.is_none() {
            start = Some(i);
            i += 2;
        } else if pair == EOI {
            if let Some(s) = start.take() {
                frames.push((s, i + 2));
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    frames
}
