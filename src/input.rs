//! Input model: tools, modifier keys, pointer buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the single gesture tracked between pointer-down and
//! pointer-up; because it is one enum, at most one gesture can be active.
//! Every point stored in a gesture is in base space.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::camera::{Point, Rect};
use crate::doc::{CropWindow, GuideRef, Orientation, TextKind};
use crate::hit::ResizeAnchor;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Select, drag, resize, and crop existing items.
    Move,
    /// Draw a region whose text covers the page content.
    #[default]
    Replace,
    /// Draw a region whose text is added on top.
    Add,
    /// Draw a background-coloured patch.
    RemoveObject,
    /// Draw the box for the staged image.
    PlaceImage,
}

impl Tool {
    /// What a draw gesture with this tool produces, if it draws at all.
    #[must_use]
    pub fn draw_kind(self) -> Option<DrawKind> {
        match self {
            Self::Move => None,
            Self::Replace => Some(DrawKind::Text(TextKind::Replace)),
            Self::Add => Some(DrawKind::Text(TextKind::Add)),
            Self::RemoveObject => Some(DrawKind::Remove),
            Self::PlaceImage => Some(DrawKind::Image),
        }
    }

    /// Resting cursor for this tool.
    #[must_use]
    pub fn cursor(self) -> Cursor {
        match self {
            Self::Move => Cursor::Default,
            _ => Cursor::Crosshair,
        }
    }
}

/// The item a draw gesture will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Text(TextKind),
    Remove,
    Image,
}

impl DrawKind {
    /// Minimum committed extent on both axes, in base px.
    #[must_use]
    pub fn min_extent(self) -> f64 {
        match self {
            Self::Image => crate::consts::MIN_DRAW_IMAGE,
            Self::Text(_) | Self::Remove => crate::consts::MIN_DRAW_REGION,
        }
    }
}

/// Positional reference into one of the two workspace stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "store", content = "index", rename_all = "lowercase")]
pub enum ItemRef {
    /// Index into the text/remove store.
    Region(usize),
    /// Index into the image store.
    Image(usize),
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`, `"+"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cursor {
    Default,
    Crosshair,
    Grab,
    Grabbing,
    Resize(ResizeAnchor),
    /// Over a horizontal guide.
    RowResize,
    /// Over a vertical guide.
    ColResize,
}

impl Cursor {
    #[must_use]
    pub fn for_guide(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::RowResize,
            Orientation::Vertical => Self::ColResize,
        }
    }
}

/// Persistent selection state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The selected region or image; controls resize-handle visibility.
    pub selected: Option<ItemRef>,
    /// The selected guide line, if any.
    pub selected_guide: Option<GuideRef>,
    /// Image index whose crop window is being edited.
    pub crop_target: Option<usize>,
}

impl UiState {
    /// Drop every selection, including crop mode.
    pub fn clear(&mut self) {
        self.selected = None;
        self.selected_guide = None;
        self.crop_target = None;
    }
}

/// Crop context captured when a crop-mode resize begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGesture {
    /// Crop window at gesture start.
    pub orig_crop: CropWindow,
    /// Displayed base px per intrinsic px, horizontally. Held for the whole gesture.
    pub scale_x: f64,
    /// Displayed base px per intrinsic px, vertically. Held for the whole gesture.
    pub scale_y: f64,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Sizing a new item from its origin corner.
    Drawing {
        kind: DrawKind,
        /// Base-space corner where the gesture started.
        origin: Point,
        /// Latest base-space pointer position.
        current: Point,
    },
    /// Moving an existing item.
    Dragging {
        target: ItemRef,
        /// Pointer minus item origin at gesture start.
        offset: Point,
    },
    /// Dragging one of the eight handles of the selected item.
    Resizing {
        target: ItemRef,
        anchor: ResizeAnchor,
        /// Base-space pointer position at gesture start.
        start: Point,
        /// Item rectangle at gesture start.
        orig: Rect,
        /// Corner drags on images keep the visible aspect ratio.
        aspect_locked: bool,
        crop: Option<CropGesture>,
    },
    /// Dragging a guide line.
    PanningGuide { guide: GuideRef },
}

impl InputState {
    /// The unnormalized rectangle of an in-flight draw gesture.
    #[must_use]
    pub fn pending_rect(&self) -> Option<(DrawKind, Rect)> {
        match self {
            Self::Drawing { kind, origin, current } => {
                Some((*kind, Rect::new(origin.x, origin.y, current.x - origin.x, current.y - origin.y)))
            }
            _ => None,
        }
    }
}
