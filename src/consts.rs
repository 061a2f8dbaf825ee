//! Shared numeric constants for the editor engine.

use crate::color::Rgb;

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Zoom increment for the zoom-in / zoom-out commands.
pub const ZOOM_STEP: f64 = 0.25;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space proximity for resize handles, in pixels.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Screen-space proximity for guide lines, in pixels.
pub const GUIDE_HIT_PX: f64 = 5.0;

// ── Gesture thresholds (base px) ────────────────────────────────

/// A drawn text or remove region must exceed this on both axes.
pub const MIN_DRAW_REGION: f64 = 10.0;

/// A drawn image box must exceed this on both axes.
pub const MIN_DRAW_IMAGE: f64 = 20.0;

/// Smallest width/height a resize gesture may produce.
pub const MIN_RESIZE: f64 = 20.0;

// ── Text ────────────────────────────────────────────────────────

/// Horizontal inset between the region edge and its text, per side.
pub const TEXT_MARGIN: f64 = 5.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.4;

/// Cap height as a fraction of the font size; used to center glyphs in a line box.
pub const CAP_HEIGHT_EM: f64 = 0.7;

/// Font size used when a draft has none.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Font family used when a draft has none.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Bounds applied to classifier font-size suggestions.
pub const MIN_SUGGESTED_FONT_SIZE: f64 = 8.0;
pub const MAX_SUGGESTED_FONT_SIZE: f64 = 72.0;

// ── Overlay palette ─────────────────────────────────────────────

pub const TEXT_PREVIEW_COLOR: Rgb = Rgb::new(0x66, 0x7e, 0xea);
pub const IMAGE_PREVIEW_COLOR: Rgb = Rgb::new(0x10, 0xb9, 0x81);
pub const REMOVE_PREVIEW_COLOR: Rgb = Rgb::new(0xef, 0x44, 0x44);
pub const SELECTION_COLOR: Rgb = Rgb::new(0x1e, 0x90, 0xff);
pub const IMAGE_OUTLINE_COLOR: Rgb = Rgb::new(0x10, 0xb9, 0x81);
pub const CROP_OUTLINE_COLOR: Rgb = Rgb::new(0xf5, 0x9e, 0x0b);
pub const GUIDE_COLOR: Rgb = Rgb::new(0x06, 0xb6, 0xd4);
pub const GUIDE_SELECTED_COLOR: Rgb = Rgb::new(0xf4, 0x3f, 0x5e);
pub const HIGHLIGHT_COLOR: Rgb = Rgb::new(0xf0, 0x93, 0xfb);

/// Dash segment length for outlines, in screen pixels.
pub const DASH_PX: f64 = 5.0;

/// Padding added around a highlighted region, in screen pixels.
pub const HIGHLIGHT_PAD_PX: f64 = 2.0;
