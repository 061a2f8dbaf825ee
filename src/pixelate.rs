//! Blocky text rasterization shared by the compositor and export.
//!
//! Text is laid out on a reduced-resolution offscreen surface, snapshotted,
//! and upscaled with nearest-neighbour sampling. The result depends only on
//! the region, the destination size, and the surface metrics, so preview and
//! export embed identical pixels.

#[cfg(test)]
#[path = "pixelate_test.rs"]
mod pixelate_test;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::camera::{Rect, Size};
use crate::doc::TextRegion;
use crate::render::SurfaceFactory;
use crate::text_layout::{FontSpec, layout_region_text};

/// Offscreen dimensions for a destination box at a reduction scale. Never zero.
#[must_use]
pub fn reduced_size(dest: Size, scale: f64) -> (u32, u32) {
    let w = (dest.width * scale).round().max(1.0);
    let h = (dest.height * scale).round().max(1.0);
    (w as u32, h as u32)
}

/// Rasterize a region's text at its pixelation level and upscale to `dest`.
///
/// `font_scale` maps the region's base-space font size into the destination
/// space (the zoom on screen, 1.0 for export). Returns `None` when the level is
/// off or the text is empty.
pub fn rasterize_text(factory: &dyn SurfaceFactory, region: &TextRegion, dest: Size, font_scale: f64) -> Option<RgbaImage> {
    let level = region.style.pixelate;
    if !level.is_active() || region.text.trim().is_empty() {
        return None;
    }
    let scale = level.scale();
    let (w, h) = reduced_size(dest, scale);

    let mut surface = factory.create(w, h);
    let frame = Rect::new(0.0, 0.0, dest.width * scale, dest.height * scale);
    let font_scale = font_scale * scale;
    let lines = layout_region_text(&*surface, &region.style, &region.text, frame, font_scale);
    let font = FontSpec::from_style(&region.style, font_scale);
    for line in &lines {
        surface.fill_text(&line.text, line.x, line.baseline, &font, region.style.color);
    }

    let small = surface.snapshot();
    let (dw, dh) = reduced_size(dest, 1.0);
    Some(imageops::resize(&small, dw, dh, FilterType::Nearest))
}
