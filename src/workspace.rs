//! Workspaces: one per open tab, each with its own document and regions.
//!
//! `Workspaces` is the explicit active-workspace accessor. Everything an input
//! handler mutates lives inside a single `Workspace`, so switching tabs swaps
//! the whole editing context at once.

#[cfg(test)]
#[path = "workspace_test.rs"]
mod workspace_test;

use std::sync::Arc;

use image::RgbaImage;
use uuid::Uuid;

use crate::camera::{Camera, Size};
use crate::doc::{GuideLines, ImageRegion, Region, RegionStore};
use crate::edit::EditState;
use crate::input::{InputState, Tool, UiState};
use crate::page::LoadedDocument;

/// Name of a workspace with no document.
pub const UNTITLED: &str = "Untitled";

/// Per-tab editing state.
#[derive(Debug)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub document: Option<LoadedDocument>,
    /// 1-indexed; 1 when no document is loaded.
    pub current_page: u32,
    pub camera: Camera,
    pub tool: Tool,
    pub regions: RegionStore<Region>,
    pub images: RegionStore<ImageRegion>,
    pub guides: GuideLines,
    /// Current page rendered at the current zoom.
    pub page_raster: Option<RgbaImage>,
    pub ui: UiState,
    pub input: InputState,
    pub edit: EditState,
    /// Image waiting to be placed with the place-image tool.
    pub staged_image: Option<Arc<RgbaImage>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: UNTITLED.to_owned(),
            document: None,
            current_page: 1,
            camera: Camera::default(),
            tool: Tool::default(),
            regions: RegionStore::new(),
            images: RegionStore::new(),
            guides: GuideLines::default(),
            page_raster: None,
            ui: UiState::default(),
            input: InputState::default(),
            edit: EditState::default(),
            staged_image: None,
        }
    }
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.document.as_ref().map_or(0, |d| d.info.page_count())
    }

    /// Base size of the current page, or zero without a document.
    #[must_use]
    pub fn page_size(&self) -> Size {
        self.document
            .as_ref()
            .and_then(|d| d.info.page_size(self.current_page))
            .unwrap_or_default()
    }

    /// Screen size of the current page at the current zoom.
    #[must_use]
    pub fn viewport(&self) -> Size {
        let base = self.page_size();
        let zoom = self.camera.zoom();
        Size::new(base.width * zoom, base.height * zoom)
    }

    /// Drop the document and every edit, keeping the identity.
    pub fn reset(&mut self) {
        let id = self.id;
        *self = Self { id, ..Self::default() };
    }
}

/// Ordered tabs with exactly one active. Never empty.
#[derive(Debug)]
pub struct Workspaces {
    tabs: Vec<Workspace>,
    active: usize,
}

impl Default for Workspaces {
    fn default() -> Self {
        Self { tabs: vec![Workspace::new()], active: 0 }
    }
}

impl Workspaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> &Workspace {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Workspace {
        &mut self.tabs[self.active]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workspace> {
        self.tabs.iter()
    }

    /// Open an empty tab and make it active. Returns its index.
    pub fn new_tab(&mut self) -> usize {
        self.tabs.push(Workspace::new());
        self.active = self.tabs.len() - 1;
        tracing::info!(tab = self.active, tabs = self.tabs.len(), "workspace opened");
        self.active
    }

    /// Make `index` active. Returns `false` if there is no such tab.
    pub fn switch(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// Close a tab. The last remaining tab is reset instead of removed.
    /// Returns `false` if there is no such tab.
    pub fn close(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        if self.tabs.len() == 1 {
            self.tabs[0].reset();
            tracing::info!("last workspace reset");
            return true;
        }
        let closed = self.tabs.remove(index);
        if index < self.active || self.active >= self.tabs.len() {
            self.active -= 1;
        }
        tracing::info!(tab = index, id = %closed.id, tabs = self.tabs.len(), "workspace closed");
        true
    }
}
