//! Hit-testing: resize handles, images, regions, and guide lines.
//!
//! Handle and guide tests run in screen space against the projected geometry so
//! their pixel thresholds stay constant under zoom. Body tests run in base space
//! against stored rectangles.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::Serialize;

use crate::camera::{Camera, Point, Rect, Size};
use crate::consts::{GUIDE_HIT_PX, HANDLE_RADIUS_PX};
use crate::doc::{GuideLines, GuideRef, ImageRegion, Orientation, Placed, Region, RegionStore};
use crate::input::{ItemRef, UiState};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Se | Self::Sw | Self::Nw)
    }

    /// Moves the left edge.
    #[must_use]
    pub fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Moves the right edge.
    #[must_use]
    pub fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Moves the top edge.
    #[must_use]
    pub fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Moves the bottom edge.
    #[must_use]
    pub fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A resize handle of the selected item.
    Handle(ItemRef, ResizeAnchor),
    /// The body of an image or region.
    Item(ItemRef),
    /// A guide line.
    Guide(GuideRef),
}

/// Classify `p` against the edges of `rect` with a proximity `threshold`.
///
/// Corners win over edges. Returns `None` outside the padded box and in the
/// interior away from every edge.
#[must_use]
pub fn classify_anchor(p: Point, rect: Rect, threshold: f64) -> Option<ResizeAnchor> {
    if !rect.inflate(threshold).contains(p) {
        return None;
    }
    let near_w = (p.x - rect.x).abs() <= threshold;
    let near_e = (p.x - rect.right()).abs() <= threshold;
    let near_n = (p.y - rect.y).abs() <= threshold;
    let near_s = (p.y - rect.bottom()).abs() <= threshold;

    let anchor = match (near_n, near_s, near_w, near_e) {
        (true, _, true, _) => ResizeAnchor::Nw,
        (true, _, _, true) => ResizeAnchor::Ne,
        (_, true, true, _) => ResizeAnchor::Sw,
        (_, true, _, true) => ResizeAnchor::Se,
        (true, _, _, _) => ResizeAnchor::N,
        (_, true, _, _) => ResizeAnchor::S,
        (_, _, true, _) => ResizeAnchor::W,
        (_, _, _, true) => ResizeAnchor::E,
        _ => return None,
    };
    Some(anchor)
}

/// Centers of the eight resize handles: four corners then four edge midpoints.
#[must_use]
pub fn handle_positions(rect: Rect) -> [(ResizeAnchor, Point); 8] {
    let c = rect.center();
    [
        (ResizeAnchor::Nw, Point::new(rect.x, rect.y)),
        (ResizeAnchor::Ne, Point::new(rect.right(), rect.y)),
        (ResizeAnchor::Se, Point::new(rect.right(), rect.bottom())),
        (ResizeAnchor::Sw, Point::new(rect.x, rect.bottom())),
        (ResizeAnchor::N, Point::new(c.x, rect.y)),
        (ResizeAnchor::E, Point::new(rect.right(), c.y)),
        (ResizeAnchor::S, Point::new(c.x, rect.bottom())),
        (ResizeAnchor::W, Point::new(rect.x, c.y)),
    ]
}

/// Screen-space position of a guide along its axis.
#[must_use]
pub fn guide_offset(orientation: Orientation, ratio: f64, viewport: Size) -> f64 {
    match orientation {
        Orientation::Horizontal => ratio * viewport.height,
        Orientation::Vertical => ratio * viewport.width,
    }
}

/// The last-added guide within the pixel threshold of a screen point.
#[must_use]
pub fn guide_at(screen_pt: Point, guides: &GuideLines, viewport: Size) -> Option<GuideRef> {
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let along = match orientation {
            Orientation::Horizontal => screen_pt.y,
            Orientation::Vertical => screen_pt.x,
        };
        let found = guides
            .list(orientation)
            .iter()
            .enumerate()
            .rev()
            .find(|(_, ratio)| (guide_offset(orientation, **ratio, viewport) - along).abs() <= GUIDE_HIT_PX);
        if let Some((index, _)) = found {
            return Some(GuideRef { orientation, index });
        }
    }
    None
}

/// Read-only view of everything a pointer-down can hit.
pub struct HitScene<'a> {
    pub camera: &'a Camera,
    pub page: u32,
    pub regions: &'a RegionStore<Region>,
    pub images: &'a RegionStore<ImageRegion>,
    pub guides: &'a GuideLines,
    pub viewport: Size,
    pub ui: &'a UiState,
    /// Region index held by an open edit session; never hit.
    pub locked: Option<usize>,
}

impl HitScene<'_> {
    /// Base-space rectangle of a referenced item.
    #[must_use]
    pub fn rect_of(&self, item: ItemRef) -> Option<Rect> {
        match item {
            ItemRef::Region(i) => self.regions.get(i).map(Placed::rect),
            ItemRef::Image(i) => self.images.get(i).map(Placed::rect),
        }
    }

    /// Priority cascade for the move tool: selected handles, images, regions, guides.
    #[must_use]
    pub fn hit_test(&self, screen_pt: Point) -> Option<Hit> {
        if let Some(sel) = self.ui.selected {
            let locked = matches!((sel, self.locked), (ItemRef::Region(i), Some(l)) if i == l);
            if !locked {
                if let Some(rect) = self.rect_of(sel) {
                    let projected = self.camera.rect_to_screen(rect);
                    if let Some(anchor) = classify_anchor(screen_pt, projected, HANDLE_RADIUS_PX) {
                        return Some(Hit::Handle(sel, anchor));
                    }
                }
            }
        }

        let base_pt = self.camera.screen_to_base(screen_pt);
        if let Some(i) = self.images.topmost_at(self.page, base_pt, None) {
            return Some(Hit::Item(ItemRef::Image(i)));
        }
        if let Some(i) = self.regions.topmost_at(self.page, base_pt, self.locked) {
            return Some(Hit::Item(ItemRef::Region(i)));
        }
        guide_at(screen_pt, self.guides, self.viewport).map(Hit::Guide)
    }

    /// Topmost item under the pointer, images first. Used by double-click.
    #[must_use]
    pub fn item_at(&self, screen_pt: Point) -> Option<ItemRef> {
        let base_pt = self.camera.screen_to_base(screen_pt);
        self.images
            .topmost_at(self.page, base_pt, None)
            .map(ItemRef::Image)
            .or_else(|| self.regions.topmost_at(self.page, base_pt, self.locked).map(ItemRef::Region))
    }
}
