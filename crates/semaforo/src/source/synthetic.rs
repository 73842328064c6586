// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Procedurally generated frames for `synthetic:<seed>` sources.

use image::{Rgb, RgbImage};

use crate::error::CameraError;

use super::FrameSource;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

/// Endless deterministic test-pattern feed: a seed-tinted gradient with a
/// moving block so consecutive frames differ.
pub struct SyntheticSource {
    seed: u64,
    frame: u64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self { seed, frame: 0 }
    }
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CameraError> {
        let n = self.frame;
        self.frame += 1;

        let tint = ((self.seed * 53) % 200) as u8;
        let mut img = RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, tint])
        });

        // A 24px block sweeping left to right, one pixel per frame.
        let bx = (n % u64::from(WIDTH - 24)) as u32;
        for y in 100..124 {
            for x in bx..bx + 24 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        Ok(Some(img))
    }

    fn rewind(&mut self) -> Result<(), CameraError> {
        self.frame = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn frames_differ_and_rewind_repeats() -> anyhow::Result<()> {
        let mut src = SyntheticSource::new(1);
        let a = src.read_frame()?.context("first frame")?;
        let b = src.read_frame()?.context("second frame")?;
        assert_ne!(a.as_raw(), b.as_raw());

        src.rewind()?;
        let a2 = src.read_frame()?.context("frame after rewind")?;
        assert_eq!(a.as_raw(), a2.as_raw());
        Ok(())
    }

    #[test]
    fn seed_changes_tint() -> anyhow::Result<()> {
        let mut a = SyntheticSource::new(0);
        let mut b = SyntheticSource::new(1);
        let fa = a.read_frame()?.context("seed 0 frame")?;
        let fb = b.read_frame()?.context("seed 1 frame")?;
        assert_ne!(fa.as_raw(), fb.as_raw());
        Ok(())
    }
}
