//! Text-entry edit sessions.
//!
//! A session holds a draft text region while the host's side panel is open.
//! New regions are appended only when the user confirms text; editing an
//! existing region locks its index so no gesture can touch it until commit or
//! cancel. Each session gets a fresh id so late classifier results can be
//! matched against the session that requested them.

#[cfg(test)]
#[path = "edit_test.rs"]
mod edit_test;

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::camera::Rect;
use crate::classify::{ClassifyError, StyleHints, StyleRequest};
use crate::doc::{FontWeight, Region, RegionStore, TextRegion};
use crate::error::ErrorCode;
use crate::sample::snapshot;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("no edit session is open")]
    NoSession,

    #[error("text is empty")]
    EmptyText,

    /// The region being edited is gone or is no longer a text region.
    #[error("region {0} is not a text region")]
    TargetMissing(usize),
}

impl ErrorCode for EditError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoSession => "E_NO_EDIT_SESSION",
            Self::EmptyText => "E_EMPTY_TEXT",
            Self::TargetMissing(_) => "E_EDIT_TARGET_MISSING",
        }
    }
}

/// Where a committed draft goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Append as a new region.
    New,
    /// Replace the region at this index in place.
    Existing(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub id: u64,
    pub target: EditTarget,
    pub draft: TextRegion,
}

/// Session id source shared by every workspace of an engine.
///
/// Ids never repeat across tabs, so a late style reply for one tab's draft
/// cannot match a session opened in another.
#[derive(Debug, Default)]
pub struct SessionIds {
    last: u64,
}

impl SessionIds {
    pub fn allocate(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

#[derive(Debug, Default)]
pub struct EditState {
    session: Option<EditSession>,
}

impl EditState {
    fn open(&mut self, id: u64, target: EditTarget, draft: TextRegion) -> u64 {
        if let Some(prev) = self.session.replace(EditSession { id, target, draft }) {
            tracing::debug!(session = prev.id, "edit session superseded");
        }
        id
    }

    /// Start editing a region that does not exist yet. Returns the session id.
    pub fn open_new(&mut self, id: u64, draft: TextRegion) -> u64 {
        self.open(id, EditTarget::New, draft)
    }

    /// Start editing the region at `index`, locking it.
    pub fn open_existing(&mut self, id: u64, index: usize, region: &TextRegion) -> u64 {
        self.open(id, EditTarget::Existing(index), region.clone())
    }

    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut TextRegion> {
        self.session.as_mut().map(|s| &mut s.draft)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Region index no gesture may touch while the session is open.
    #[must_use]
    pub fn locked_index(&self) -> Option<usize> {
        match self.session.as_ref()?.target {
            EditTarget::Existing(i) => Some(i),
            EditTarget::New => None,
        }
    }

    /// Close the session without writing anything.
    pub fn cancel(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Keep the lock pointing at the same region after `index` was removed.
    pub fn region_removed(&mut self, index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let EditTarget::Existing(locked) = session.target {
            if locked == index {
                self.session = None;
            } else if locked > index {
                session.target = EditTarget::Existing(locked - 1);
            }
        }
    }

    /// Apply classifier hints to the draft if `session_id` is still open.
    /// Returns whether anything was applied.
    pub fn apply_hints(&mut self, session_id: u64, hints: &StyleHints) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.id == session_id) else {
            tracing::debug!(session = session_id, "discarding style hints for closed session");
            return false;
        };
        let style = &mut session.draft.style;
        if let Some(size) = hints.font_size {
            style.font_size = size;
        }
        if let Some(family) = &hints.font_family {
            style.font_family.clone_from(family);
        }
        if let Some(color) = hints.color {
            style.color = color;
        }
        if let Some(bold) = hints.bold {
            style.weight = if bold { FontWeight::Bold } else { FontWeight::Normal };
        }
        if let Some(italic) = hints.italic {
            style.italic = italic;
        }
        true
    }

    /// Write the draft with `text` into the store and close the session.
    ///
    /// # Errors
    ///
    /// - [`EditError::NoSession`] if nothing is being edited.
    /// - [`EditError::EmptyText`] for whitespace-only text; the session stays open.
    /// - [`EditError::TargetMissing`] if the edited region is gone; the session is closed.
    pub fn commit(&mut self, text: &str, regions: &mut RegionStore<Region>) -> Result<usize, EditError> {
        if self.session.is_none() {
            return Err(EditError::NoSession);
        }
        if text.trim().is_empty() {
            return Err(EditError::EmptyText);
        }
        let Some(session) = self.session.take() else {
            return Err(EditError::NoSession);
        };
        let mut region = session.draft;
        region.text = text.to_owned();

        match session.target {
            EditTarget::New => Ok(regions.push(Region::Text(region))),
            EditTarget::Existing(index) => match regions.get(index) {
                Some(Region::Text(_)) => {
                    regions.replace(index, Region::Text(region));
                    Ok(index)
                }
                _ => Err(EditError::TargetMissing(index)),
            },
        }
    }
}

/// Build a classifier request from the page pixels under a region.
///
/// `screen_rect` addresses the raster; `base` supplies the size quoted in the prompt.
///
/// # Errors
///
/// Returns [`ClassifyError::Encode`] if the region is off the raster or PNG
/// encoding fails.
pub fn style_request(session: u64, raster: &RgbaImage, screen_rect: Rect, base: Rect) -> Result<StyleRequest, ClassifyError> {
    let pixels =
        snapshot(raster, screen_rect).ok_or_else(|| ClassifyError::Encode("region is outside the page raster".into()))?;
    let mut png = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ClassifyError::Encode(e.to_string()))?;
    Ok(StyleRequest {
        session,
        png,
        width: base.width.round().max(1.0) as u32,
        height: base.height.round().max(1.0) as u32,
    })
}
