//! Colour sampling over the rendered page raster.
//!
//! Both routines are read-only: they inspect the page renderer's RGBA buffer
//! and return a colour for the caller to attach to a region. Rectangles are in
//! the raster's own pixel space (screen space for the current page). Pixels
//! outside the raster are skipped, so a region hanging off the page degrades
//! to the default colour instead of failing.

#[cfg(test)]
#[path = "sample_test.rs"]
mod sample_test;

use std::collections::HashMap;

use image::RgbaImage;

use crate::camera::Rect;
use crate::color::Rgb;

/// Pixels with alpha below this are ignored.
const MIN_ALPHA: u8 = 128;

/// Pixels brighter than this are treated as paper.
const PAPER_BRIGHTNESS: f64 = 240.0;

/// Quantized colours at or above this brightness are not text candidates.
const MAX_TEXT_BRIGHTNESS: f64 = 200.0;

/// Quantization step per channel.
const BUCKET: f64 = 16.0;

/// Integer pixel bounds of `rect` clipped to the raster, as `(x0, y0, x1, y1)` exclusive.
fn clip(raster: &RgbaImage, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    let rect = rect.normalized();
    let w = f64::from(raster.width());
    let h = f64::from(raster.height());
    let x0 = rect.x.round().clamp(0.0, w);
    let y0 = rect.y.round().clamp(0.0, h);
    let x1 = rect.right().round().clamp(0.0, w);
    let y1 = rect.bottom().round().clamp(0.0, h);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

fn quantize(channel: u8) -> u8 {
    let q = (f64::from(channel) / BUCKET).round() * BUCKET;
    q.min(255.0) as u8
}

/// Most frequent dark colour under `rect`, for matching existing text colour.
///
/// Near-white and near-transparent pixels are discarded, the rest are bucketed
/// to 16 levels per channel, and the most frequent bucket darker than 200 wins.
/// Ties go to the bucket seen first in row-major order. Defaults to black.
#[must_use]
pub fn dominant_foreground(raster: &RgbaImage, rect: Rect) -> Rgb {
    let Some((x0, y0, x1, y1)) = clip(raster, rect) else {
        return Rgb::BLACK;
    };

    let mut order: Vec<Rgb> = Vec::new();
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    for y in y0..y1 {
        for x in x0..x1 {
            let [r, g, b, a] = raster.get_pixel(x, y).0;
            if a < MIN_ALPHA || Rgb::new(r, g, b).brightness() > PAPER_BRIGHTNESS {
                continue;
            }
            let bucket = Rgb::new(quantize(r), quantize(g), quantize(b));
            let count = counts.entry(bucket).or_insert(0);
            if *count == 0 {
                order.push(bucket);
            }
            *count += 1;
        }
    }

    let mut best = Rgb::BLACK;
    let mut best_count = 0;
    for bucket in order {
        let count = counts.get(&bucket).copied().unwrap_or(0);
        if count > best_count && bucket.brightness() < MAX_TEXT_BRIGHTNESS {
            best = bucket;
            best_count = count;
        }
    }
    best
}

/// The eight probe points of a rectangle: four corners then four edge midpoints.
fn probe_points(x0: u32, y0: u32, x1: u32, y1: u32) -> [(u32, u32); 8] {
    let (xl, xr) = (x0, x1 - 1);
    let (yt, yb) = (y0, y1 - 1);
    let xm = x0 + (x1 - x0) / 2;
    let ym = y0 + (y1 - y0) / 2;
    [(xl, yt), (xr, yt), (xl, yb), (xr, yb), (xm, yt), (xm, yb), (xl, ym), (xr, ym)]
}

/// Average colour at the rectangle's corners and edge midpoints.
///
/// Samples with alpha below 128 are skipped; white when none remain.
#[must_use]
pub fn dominant_background(raster: &RgbaImage, rect: Rect) -> Rgb {
    let Some((x0, y0, x1, y1)) = clip(raster, rect) else {
        return Rgb::WHITE;
    };

    let mut sum = [0u32; 3];
    let mut n = 0u32;
    for (x, y) in probe_points(x0, y0, x1, y1) {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        if a < MIN_ALPHA {
            continue;
        }
        sum[0] += u32::from(r);
        sum[1] += u32::from(g);
        sum[2] += u32::from(b);
        n += 1;
    }
    if n == 0 {
        return Rgb::WHITE;
    }

    let avg = |s: u32| (f64::from(s) / f64::from(n)).round().clamp(0.0, 255.0) as u8;
    Rgb::new(avg(sum[0]), avg(sum[1]), avg(sum[2]))
}

/// Copy the pixels under `rect` out of the raster, clipped to its bounds.
#[must_use]
pub fn snapshot(raster: &RgbaImage, rect: Rect) -> Option<RgbaImage> {
    let (x0, y0, x1, y1) = clip(raster, rect)?;
    Some(image::imageops::crop_imm(raster, x0, y0, x1 - x0, y1 - y0).to_image())
}
