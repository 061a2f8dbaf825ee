//! Region model: the edits placed on a document and the per-workspace stores.
//!
//! Every rectangle in this module is in base space. Text and remove regions
//! share one ordered store; image regions live in a second store that always
//! composites above the first. Stores are positional: removing an entry shifts
//! the indices of everything after it, and an out-of-range index is a caller
//! bug that fails fast through slice indexing.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::sync::Arc;

use image::RgbaImage;
use serde::Serialize;

use crate::camera::{Point, Rect};
use crate::color::Rgb;
use crate::consts::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};

/// Whether a text region covers existing content or is simply added on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Paint the sampled background first, then the text.
    Replace,
    /// Text only, no background patch.
    Add,
}

/// Font weight ordinal 0–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Semibold,
    Bold,
    Extrabold,
}

impl FontWeight {
    /// Map an ordinal to a weight; out-of-range values saturate to `Extrabold`.
    #[must_use]
    pub fn from_ordinal(n: u8) -> Self {
        match n {
            0 => Self::Normal,
            1 => Self::Semibold,
            2 => Self::Bold,
            _ => Self::Extrabold,
        }
    }

    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Semibold => 1,
            Self::Bold => 2,
            Self::Extrabold => 3,
        }
    }

    /// Whether export should pick the bold standard font.
    #[must_use]
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::Extrabold)
    }
}

/// Horizontal text alignment within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Pixelation ordinal 0–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelateLevel {
    #[default]
    Off,
    Light,
    Medium,
    Heavy,
}

impl PixelateLevel {
    /// Map an ordinal to a level; out-of-range values saturate to `Heavy`.
    #[must_use]
    pub fn from_ordinal(n: u8) -> Self {
        match n {
            0 => Self::Off,
            1 => Self::Light,
            2 => Self::Medium,
            _ => Self::Heavy,
        }
    }

    /// Downsample factor for the offscreen text surface.
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::Off => 1.0,
            Self::Light => 0.75,
            Self::Medium => 0.5,
            Self::Heavy => 0.25,
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        self != Self::Off
    }
}

/// Typography of a text region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub color: Rgb,
    pub weight: FontWeight,
    pub italic: bool,
    pub align: TextAlign,
    pub pixelate: PixelateLevel,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            color: Rgb::BLACK,
            weight: FontWeight::Normal,
            italic: false,
            align: TextAlign::Left,
            pixelate: PixelateLevel::Off,
        }
    }
}

/// A replace/add text edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    pub kind: TextKind,
    /// 1-indexed page number.
    pub page: u32,
    pub rect: Rect,
    /// May contain newlines.
    pub text: String,
    pub style: TextStyle,
    /// Sampled from the page for `Replace`; white for `Add`.
    pub background: Rgb,
}

/// A same-colour patch hiding underlying page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoveRegion {
    pub page: u32,
    pub rect: Rect,
    pub background: Rgb,
}

/// Entry of the text/remove store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Region {
    Text(TextRegion),
    Remove(RemoveRegion),
}

impl Region {
    /// Whether the compositor paints a background patch for this region.
    #[must_use]
    pub fn fills_background(&self) -> bool {
        match self {
            Self::Text(t) => t.kind == TextKind::Replace,
            Self::Remove(_) => true,
        }
    }

    #[must_use]
    pub fn background(&self) -> Rgb {
        match self {
            Self::Text(t) => t.background,
            Self::Remove(r) => r.background,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextRegion> {
        match self {
            Self::Text(t) => Some(t),
            Self::Remove(_) => None,
        }
    }
}

/// Inset crop window in intrinsic image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CropWindow {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CropWindow {
    /// Whether the window leaves a non-empty visible area of an image.
    #[must_use]
    pub fn fits(&self, original_width: f64, original_height: f64) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.right >= 0.0
            && self.bottom >= 0.0
            && self.left + self.right < original_width
            && self.top + self.bottom < original_height
    }
}

/// A raster placed over the page.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRegion {
    pub page: u32,
    pub rect: Rect,
    #[serde(skip)]
    pub source: Arc<RgbaImage>,
    pub original_width: f64,
    pub original_height: f64,
    pub crop: CropWindow,
}

impl ImageRegion {
    #[must_use]
    pub fn new(page: u32, rect: Rect, source: Arc<RgbaImage>) -> Self {
        let original_width = f64::from(source.width());
        let original_height = f64::from(source.height());
        Self { page, rect, source, original_width, original_height, crop: CropWindow::default() }
    }

    /// The visible window of the source raster, in intrinsic pixels.
    #[must_use]
    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.crop.left,
            self.crop.top,
            self.original_width - self.crop.left - self.crop.right,
            self.original_height - self.crop.top - self.crop.bottom,
        )
    }

    /// Width/height ratio of the visible window.
    #[must_use]
    pub fn visible_aspect(&self) -> f64 {
        let src = self.source_rect();
        if src.height <= 0.0 {
            return 1.0;
        }
        src.width / src.height
    }
}

impl PartialEq for ImageRegion {
    fn eq(&self, other: &Self) -> bool {
        self.page == other.page
            && self.rect == other.rect
            && Arc::ptr_eq(&self.source, &other.source)
            && self.crop == other.crop
    }
}

/// Geometry shared by both stores.
pub trait Placed {
    fn page(&self) -> u32;
    fn rect(&self) -> Rect;
    fn rect_mut(&mut self) -> &mut Rect;
}

impl Placed for Region {
    fn page(&self) -> u32 {
        match self {
            Self::Text(t) => t.page,
            Self::Remove(r) => r.page,
        }
    }

    fn rect(&self) -> Rect {
        match self {
            Self::Text(t) => t.rect,
            Self::Remove(r) => r.rect,
        }
    }

    fn rect_mut(&mut self) -> &mut Rect {
        match self {
            Self::Text(t) => &mut t.rect,
            Self::Remove(r) => &mut r.rect,
        }
    }
}

impl Placed for ImageRegion {
    fn page(&self) -> u32 {
        self.page
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rect
    }
}

/// Ordered, insertion-preserving region collection. Order is z-order.
#[derive(Debug, Clone)]
pub struct RegionStore<T> {
    items: Vec<T>,
}

impl<T> Default for RegionStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> RegionStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append on top. Returns the new index.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Replace the entry at `index` in place, returning the old entry.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn replace(&mut self, index: usize, item: T) -> T {
        std::mem::replace(&mut self.items[index], item)
    }

    /// Remove the entry at `index`; later entries shift down by one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Placed> RegionStore<T> {
    /// Entries on `page` with their store indices, bottom first.
    pub fn on_page(&self, page: u32) -> impl DoubleEndedIterator<Item = (usize, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| item.page() == page)
    }

    /// Topmost entry on `page` whose rectangle contains `base_pt`.
    #[must_use]
    pub fn topmost_at(&self, page: u32, base_pt: Point, skip: Option<usize>) -> Option<usize> {
        self.on_page(page)
            .rev()
            .find(|(i, item)| Some(*i) != skip && item.rect().contains(base_pt))
            .map(|(i, _)| i)
    }
}

impl<'a, T> IntoIterator for &'a RegionStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Guide line orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Identifies one guide line in a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideRef {
    pub orientation: Orientation,
    pub index: usize,
}

/// Non-printing guides stored as ratios (0..1) of the viewport dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideLines {
    pub horizontal: Vec<f64>,
    pub vertical: Vec<f64>,
}

impl GuideLines {
    /// Add a guide, clamping the ratio into `0..=1`.
    pub fn add(&mut self, orientation: Orientation, ratio: f64) -> GuideRef {
        let list = self.list_mut(orientation);
        list.push(ratio.clamp(0.0, 1.0));
        GuideRef { orientation, index: list.len() - 1 }
    }

    #[must_use]
    pub fn get(&self, guide: GuideRef) -> Option<f64> {
        self.list(guide.orientation).get(guide.index).copied()
    }

    /// Move a guide. Returns `false` if it no longer exists.
    pub fn set(&mut self, guide: GuideRef, ratio: f64) -> bool {
        match self.list_mut(guide.orientation).get_mut(guide.index) {
            Some(slot) => {
                *slot = ratio.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Remove a guide if it exists.
    pub fn remove(&mut self, guide: GuideRef) -> Option<f64> {
        let list = self.list_mut(guide.orientation);
        if guide.index < list.len() {
            Some(list.remove(guide.index))
        } else {
            None
        }
    }

    #[must_use]
    pub fn list(&self, orientation: Orientation) -> &[f64] {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    fn list_mut(&mut self, orientation: Orientation) -> &mut Vec<f64> {
        match orientation {
            Orientation::Horizontal => &mut self.horizontal,
            Orientation::Vertical => &mut self.vertical,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }

    pub fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }
}
