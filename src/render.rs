//! Overlay compositor.
//!
//! Redraws the annotation overlay for the current page onto a host-provided
//! [`Surface`]. The page raster itself lives underneath on a separate layer;
//! this module only paints regions, images, guides, handles, and the live draw
//! preview. Everything is drawn in screen space: stored base geometry is
//! projected through the camera just before drawing.
//!
//! Draw order per frame:
//!
//! 1. Text/remove regions in insertion order: background patch, dashed
//!    selection outline, then text (or its pixelated raster).
//! 2. Image regions in insertion order, cropped, with an outline.
//! 3. Guide lines.
//! 4. Resize handles of the selected item.
//! 5. The dashed preview of an in-flight draw gesture.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use image::RgbaImage;

use crate::camera::{Camera, Point, Rect, Size};
use crate::color::Rgb;
use crate::consts::{
    CROP_OUTLINE_COLOR, DASH_PX, GUIDE_COLOR, GUIDE_SELECTED_COLOR, HANDLE_RADIUS_PX, IMAGE_OUTLINE_COLOR,
    IMAGE_PREVIEW_COLOR, REMOVE_PREVIEW_COLOR, SELECTION_COLOR, TEXT_PREVIEW_COLOR,
};
use crate::doc::{GuideLines, ImageRegion, Orientation, Placed, Region, RegionStore, TextRegion};
use crate::hit::{guide_offset, handle_positions};
use crate::input::{DrawKind, ItemRef, UiState};
use crate::pixelate::rasterize_text;
use crate::text_layout::{FontSpec, TextMeasure, layout_region_text};

/// A 2D drawing target: the on-screen overlay, or an offscreen buffer.
///
/// Coordinates are surface pixels with the origin top-left. Text is drawn
/// left-aligned at `x` with its baseline at `baseline`.
pub trait Surface: TextMeasure {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    /// Outline `rect`; `dash` is the segment length for a dashed stroke.
    fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f64, dash: Option<f64>);
    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, line_width: f64);
    fn fill_text(&mut self, text: &str, x: f64, baseline: f64, font: &FontSpec, color: Rgb);
    /// Draw the `src` window of `image` scaled into `dst`.
    fn draw_image(&mut self, image: &RgbaImage, src: Rect, dst: Rect, smoothing: bool);
    /// Copy of the current pixels.
    fn snapshot(&self) -> RgbaImage;
}

/// Creates offscreen surfaces, e.g. for pixelated text.
pub trait SurfaceFactory {
    fn create(&self, width: u32, height: u32) -> Box<dyn Surface>;
}

/// Everything the compositor reads for one frame.
pub struct Scene<'a> {
    pub camera: &'a Camera,
    pub page: u32,
    pub regions: &'a RegionStore<Region>,
    pub images: &'a RegionStore<ImageRegion>,
    pub guides: &'a GuideLines,
    pub ui: &'a UiState,
    /// Screen size of the page; guide ratios are relative to it.
    pub viewport: Size,
    /// Kind and unnormalized base rect of an in-flight draw gesture.
    pub pending: Option<(DrawKind, Rect)>,
}

/// Full side length of a resize handle square, in screen px.
const HANDLE_SIZE: f64 = HANDLE_RADIUS_PX;

/// Redraw the overlay.
pub fn draw(surface: &mut dyn Surface, factory: &dyn SurfaceFactory, scene: &Scene<'_>) {
    surface.clear();
    let zoom = scene.camera.zoom();

    for (i, region) in scene.regions.on_page(scene.page) {
        let rect = scene.camera.rect_to_screen(region.rect());
        if region.fills_background() {
            surface.fill_rect(rect, region.background());
        }
        if scene.ui.selected == Some(ItemRef::Region(i)) {
            surface.stroke_rect(rect, SELECTION_COLOR, 2.0, Some(DASH_PX));
        }
        if let Region::Text(text) = region {
            draw_region_text(surface, factory, text, rect, zoom);
        }
    }

    for (i, image) in scene.images.on_page(scene.page) {
        let rect = scene.camera.rect_to_screen(image.rect);
        surface.draw_image(&image.source, image.source_rect(), rect, true);
        if scene.ui.crop_target == Some(i) {
            surface.stroke_rect(rect, CROP_OUTLINE_COLOR, 2.0, Some(DASH_PX));
        } else {
            surface.stroke_rect(rect, IMAGE_OUTLINE_COLOR, 1.0, None);
        }
    }

    draw_guides(surface, scene.guides, scene.ui, scene.viewport);

    if let Some(rect) = selected_rect(scene) {
        draw_handles(surface, scene.camera.rect_to_screen(rect));
    }

    if let Some((kind, rect)) = scene.pending {
        let color = match kind {
            DrawKind::Text(_) => TEXT_PREVIEW_COLOR,
            DrawKind::Image => IMAGE_PREVIEW_COLOR,
            DrawKind::Remove => REMOVE_PREVIEW_COLOR,
        };
        surface.stroke_rect(scene.camera.rect_to_screen(rect.normalized()), color, 2.0, Some(DASH_PX));
    }
}

fn draw_region_text(surface: &mut dyn Surface, factory: &dyn SurfaceFactory, region: &TextRegion, rect: Rect, zoom: f64) {
    if region.text.trim().is_empty() {
        return;
    }
    if region.style.pixelate.is_active() {
        if let Some(raster) = rasterize_text(factory, region, Size::new(rect.width, rect.height), zoom) {
            let src = Rect::new(0.0, 0.0, f64::from(raster.width()), f64::from(raster.height()));
            surface.draw_image(&raster, src, rect, false);
        }
        return;
    }

    let lines = layout_region_text(&*surface, &region.style, &region.text, rect, zoom);
    let font = FontSpec::from_style(&region.style, zoom);
    for line in &lines {
        surface.fill_text(&line.text, line.x, line.baseline, &font, region.style.color);
    }
}

fn draw_guides(surface: &mut dyn Surface, guides: &GuideLines, ui: &UiState, viewport: Size) {
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for (index, ratio) in guides.list(orientation).iter().enumerate() {
            let selected = ui.selected_guide.is_some_and(|g| g.orientation == orientation && g.index == index);
            let color = if selected { GUIDE_SELECTED_COLOR } else { GUIDE_COLOR };
            let at = guide_offset(orientation, *ratio, viewport);
            let (from, to) = match orientation {
                Orientation::Horizontal => (Point::new(0.0, at), Point::new(viewport.width, at)),
                Orientation::Vertical => (Point::new(at, 0.0), Point::new(at, viewport.height)),
            };
            surface.stroke_line(from, to, color, if selected { 2.0 } else { 1.0 });
        }
    }
}

fn selected_rect(scene: &Scene<'_>) -> Option<Rect> {
    match scene.ui.selected? {
        ItemRef::Region(i) => scene.regions.get(i).filter(|r| r.page() == scene.page).map(Placed::rect),
        ItemRef::Image(i) => scene.images.get(i).filter(|r| r.page == scene.page).map(|r| r.rect),
    }
}

fn draw_handles(surface: &mut dyn Surface, rect: Rect) {
    let half = HANDLE_SIZE / 2.0;
    for (_, center) in handle_positions(rect) {
        let square = Rect::new(center.x - half, center.y - half, HANDLE_SIZE, HANDLE_SIZE);
        surface.fill_rect(square, Rgb::WHITE);
        surface.stroke_rect(square, SELECTION_COLOR, 1.0, None);
    }
}
