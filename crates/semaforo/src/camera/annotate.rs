// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame overlays and JPEG encoding.
//!
//! Overlays are drawn without a text rasterizer: detections get
//! class-colored boxes and the header band carries one tally block per
//! counted vehicle. The numbers themselves travel over the JSON surface.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::detect::BoundingBox;
use crate::error::CameraError;
use crate::vehicle::{ClassCounts, VehicleClass};

const JPEG_QUALITY: u8 = 80;
const BAND_HEIGHT: u32 = 24;
const BLOCK: u32 = 8;
/// Tally blocks drawn per class before clipping.
const MAX_BLOCKS: u32 = 16;

pub fn class_color(class: VehicleClass) -> Rgb<u8> {
    match class {
        VehicleClass::Car => Rgb([0, 123, 255]),
        VehicleClass::Truck => Rgb([220, 53, 69]),
        VehicleClass::Bus => Rgb([40, 167, 69]),
        VehicleClass::Ambulance => Rgb([255, 193, 7]),
        VehicleClass::Mototaxi => Rgb([111, 66, 193]),
    }
}

/// Draw detection boxes and the tally band onto the frame.
pub fn draw_overlays(frame: &mut RgbImage, boxes: &[(VehicleClass, BoundingBox)], counts: &ClassCounts) {
    for (class, bbox) in boxes {
        draw_box(frame, *class, bbox);
    }
    draw_tally_band(frame, counts);
}

/// Full-width band signalling that processing is disabled.
pub fn draw_stopped_banner(frame: &mut RgbImage) {
    let (w, h) = frame.dimensions();
    if h < 40 {
        return;
    }
    let band_y = (h / 2 - 16) as i32;
    draw_filled_rect_mut(frame, Rect::at(0, band_y).of_size(w, 32), Rgb([160, 16, 16]));
    // Hazard ticks across the band.
    let mut x = 4i32;
    while x + 12 < w as i32 {
        draw_filled_rect_mut(frame, Rect::at(x, band_y + 10).of_size(12, 12), Rgb([240, 240, 240]));
        x += 28;
    }
}

/// Encode the frame to JPEG.
pub fn encode_jpeg(frame: &RgbImage) -> Result<Bytes, CameraError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(frame.as_raw(), frame.width(), frame.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CameraError::Encode(e.to_string()))?;
    Ok(Bytes::from(out))
}

fn draw_box(frame: &mut RgbImage, class: VehicleClass, bbox: &BoundingBox) {
    let (w, h) = frame.dimensions();
    let x1 = bbox.x1.clamp(0.0, (w.saturating_sub(1)) as f32) as i32;
    let y1 = bbox.y1.clamp(0.0, (h.saturating_sub(1)) as f32) as i32;
    let x2 = bbox.x2.clamp(0.0, w as f32) as i32;
    let y2 = bbox.y2.clamp(0.0, h as f32) as i32;
    if x2 <= x1 + 1 || y2 <= y1 + 1 {
        return;
    }

    let rect = Rect::at(x1, y1).of_size((x2 - x1) as u32, (y2 - y1) as u32);
    let color = class_color(class);
    draw_hollow_rect_mut(frame, rect, color);
    // Second ring for visibility.
    if x2 - x1 > 4 && y2 - y1 > 4 {
        let inner = Rect::at(x1 + 1, y1 + 1).of_size((x2 - x1 - 2) as u32, (y2 - y1 - 2) as u32);
        draw_hollow_rect_mut(frame, inner, color);
    }
}

fn draw_tally_band(frame: &mut RgbImage, counts: &ClassCounts) {
    let (w, h) = frame.dimensions();
    if h <= BAND_HEIGHT || w < 40 {
        return;
    }
    draw_filled_rect_mut(frame, Rect::at(0, 0).of_size(w, BAND_HEIGHT), Rgb([16, 16, 16]));

    let mut x = 4u32;
    for class in VehicleClass::ALL {
        // Class swatch, then one block per vehicle.
        let color = class_color(class);
        draw_filled_rect_mut(frame, Rect::at(x as i32, 4).of_size(4, BAND_HEIGHT - 8), color);
        x += 8;
        for _ in 0..counts.get(class).min(MAX_BLOCKS) {
            if x + BLOCK + 4 >= w {
                return;
            }
            draw_filled_rect_mut(
                frame,
                Rect::at(x as i32, ((BAND_HEIGHT - BLOCK) / 2) as i32).of_size(BLOCK, BLOCK),
                color,
            );
            x += BLOCK + 2;
        }
        x += 8;
    }
}
