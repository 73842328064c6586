// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MJPEG frame broadcasting.
//!
//! Each subscriber gets its own stream of multipart parts pulled from the
//! camera mailbox. Backpressure is drop-newest: a subscriber that is not
//! reading simply misses frames; the producer never blocks. While
//! processing is stopped, frames are read straight from the configured
//! source and stamped with a "processing disabled" banner.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::Stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::camera::annotate;
use crate::mailbox::{FrameReader, FrameWait};
use crate::source;

/// Multipart boundary for `multipart/x-mixed-replace`.
pub const BOUNDARY: &str = "frame";

pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Consecutive empty waits tolerated before a live subscriber is dropped
/// (producer stalled or processing stopped mid-stream).
const MAX_MISSES: u32 = 3;

/// Frame one JPEG payload as an MJPEG part.
pub fn mjpeg_part(jpeg: &Bytes) -> Bytes {
    let mut part = BytesMut::with_capacity(jpeg.len() + 64);
    part.put_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
    part.put_slice(jpeg);
    part.put_slice(b"\r\n");
    part.freeze()
}

/// Stream of annotated frames from a camera mailbox.
pub fn live_stream(
    mut reader: FrameReader,
    frame_wait: Duration,
    cancel: CancellationToken,
) -> impl Stream<Item = std::io::Result<Bytes>> {
    async_stream::stream! {
        let mut misses = 0u32;
        loop {
            let wait = tokio::select! {
                _ = cancel.cancelled() => break,
                wait = reader.next_frame(frame_wait) => wait,
            };
            match wait {
                FrameWait::Frame(jpeg) => {
                    misses = 0;
                    yield Ok(mjpeg_part(&jpeg));
                }
                FrameWait::Timeout => {
                    misses += 1;
                    if misses > MAX_MISSES {
                        debug!("mjpeg subscriber starved, closing stream");
                        break;
                    }
                }
                FrameWait::Closed => break,
            }
        }
    }
}

/// Stream of raw frames read directly from the video source, overlaid with
/// the stopped banner. Used while processing is off.
pub fn idle_stream(
    source_spec: String,
    frame_interval: Duration,
    cancel: CancellationToken,
) -> impl Stream<Item = std::io::Result<Bytes>> {
    async_stream::stream! {
        let mut src = match source::open(&source_spec) {
            Ok(src) => src,
            Err(e) => {
                debug!(err = %e, "idle stream could not open source");
                return;
            }
        };

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let frame = match src.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    if src.rewind().is_err() {
                        break;
                    }
                    continue;
                }
                Err(_) => {
                    if src.rewind().is_err() {
                        break;
                    }
                    continue;
                }
            };

            let mut frame = frame;
            annotate::draw_stopped_banner(&mut frame);
            match annotate::encode_jpeg(&frame) {
                Ok(jpeg) => yield Ok(mjpeg_part(&jpeg)),
                Err(_) => continue,
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(frame_interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
