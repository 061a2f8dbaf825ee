//! Engine: pointer and keyboard dispatch over the active workspace.
//!
//! `EngineCore` owns every workspace and is independent of any windowing
//! toolkit. Input handlers mutate the active workspace and return [`Action`]s
//! for the host to carry out (redraw, re-rasterize the page, open the text
//! panel, run style inference). Async entry points take the external
//! collaborators as arguments so the core stays free of I/O.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use image::RgbaImage;

use crate::camera::{Point, Rect};
use crate::classify::{StyleHints, StyleRequest};
use crate::color::Rgb;
use crate::consts::{HIGHLIGHT_COLOR, HIGHLIGHT_PAD_PX, MIN_RESIZE, ZOOM_STEP};
use crate::doc::{CropWindow, ImageRegion, Orientation, Placed, Region, RemoveRegion, TextKind, TextRegion, TextStyle};
use crate::edit::{EditError, SessionIds, style_request};
use crate::error::ErrorCode;
use crate::export::{DocumentWriter, ExportError, ExportJob, export};
use crate::hit::{Hit, HitScene, ResizeAnchor};
use crate::input::{Button, CropGesture, Cursor, DrawKind, InputState, ItemRef, Key, Modifiers, Tool};
use crate::list::{RegionRow, region_rows};
use crate::page::{LoadError, LoadedDocument, PageRenderer, RenderError, check_content_type};
use crate::render::{Scene, Surface, SurfaceFactory, draw};
use crate::sample::{dominant_background, dominant_foreground};
use crate::workspace::{Workspace, Workspaces};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the overlay.
    RenderNeeded,
    /// Re-rasterize the current page (page or zoom changed).
    PageRenderNeeded,
    SetCursor(Cursor),
    /// Open the text panel for a draft.
    TextEntryRequested { session: u64, draft: TextRegion },
    /// Refresh the open text panel with an updated draft.
    DraftUpdated { session: u64, draft: TextRegion },
    /// Close the text panel.
    TextEntryClosed,
    /// Run the style classifier and feed the result to `apply_style_hints`.
    StyleInferenceRequested(StyleRequest),
    /// Rebuild the region list from `region_rows`.
    RegionListChanged,
    /// Flash an outline around a screen rectangle.
    Highlight { rect: Rect, color: Rgb },
}

/// Core engine state: all logic that doesn't depend on a host surface.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub workspaces: Workspaces,
    /// A host text input has keyboard focus; page and guide shortcuts are suppressed.
    pub text_focus: bool,
    sessions: SessionIds,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active workspace.
    #[must_use]
    pub fn ws(&self) -> &Workspace {
        self.workspaces.active()
    }

    pub fn ws_mut(&mut self) -> &mut Workspace {
        self.workspaces.active_mut()
    }

    // --- Tools ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let ws = self.ws_mut();
        ws.tool = tool;
        ws.input = InputState::Idle;
        vec![Action::SetCursor(tool.cursor()), Action::RenderNeeded]
    }

    /// Stage an image for placement and switch to the place-image tool.
    pub fn stage_image(&mut self, image: Arc<RgbaImage>) -> Vec<Action> {
        self.ws_mut().staged_image = Some(image);
        self.set_tool(Tool::PlaceImage)
    }

    pub fn set_text_focus(&mut self, focused: bool) {
        self.text_focus = focused;
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || self.ws().document.is_none() {
            return Vec::new();
        }
        let ws = self.ws_mut();
        let base_pt = ws.camera.screen_to_base(screen_pt);

        let Some(kind) = ws.tool.draw_kind() else {
            return pointer_down_move_tool(ws, screen_pt, base_pt);
        };
        if kind == DrawKind::Image && ws.staged_image.is_none() {
            return Vec::new();
        }
        ws.input = InputState::Drawing { kind, origin: base_pt, current: base_pt };
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let ws = self.ws_mut();
        let base_pt = ws.camera.screen_to_base(screen_pt);

        match ws.input.clone() {
            InputState::Idle => vec![Action::SetCursor(hover_cursor(ws, screen_pt))],
            InputState::Drawing { kind, origin, .. } => {
                ws.input = InputState::Drawing { kind, origin, current: base_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { target, offset } => {
                if let Some(rect) = rect_mut(ws, target) {
                    rect.x = base_pt.x - offset.x;
                    rect.y = base_pt.y - offset.y;
                }
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { target, anchor, start, orig, aspect_locked, crop } => {
                let dx = base_pt.x - start.x;
                let dy = base_pt.y - start.y;
                match (target, crop) {
                    (ItemRef::Image(i), Some(gesture)) => {
                        let Some(image) = ws.images.get_mut(i) else {
                            return Vec::new();
                        };
                        let resized =
                            crop_resize(orig, anchor, dx, dy, &gesture, image.original_width, image.original_height);
                        if let Some((rect, window)) = resized {
                            image.rect = rect;
                            image.crop = window;
                        }
                    }
                    _ => {
                        let aspect = match target {
                            ItemRef::Image(i) if aspect_locked => ws.images.get(i).map(ImageRegion::visible_aspect),
                            _ => None,
                        };
                        if let Some(rect) = rect_mut(ws, target) {
                            *rect = resize_rect(orig, anchor, dx, dy, aspect);
                        }
                    }
                }
                vec![Action::RenderNeeded]
            }
            InputState::PanningGuide { guide } => {
                let viewport = ws.viewport();
                let (along, extent) = match guide.orientation {
                    Orientation::Horizontal => (screen_pt.y, viewport.height),
                    Orientation::Vertical => (screen_pt.x, viewport.width),
                };
                if extent > 0.0 {
                    ws.guides.set(guide, along / extent);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let ws = self.workspaces.active_mut();
        match std::mem::take(&mut ws.input) {
            InputState::Idle => Vec::new(),
            InputState::Drawing { kind, origin, current } => {
                let rect = Rect::new(origin.x, origin.y, current.x - origin.x, current.y - origin.y).normalized();
                commit_draw(ws, &mut self.sessions, kind, rect)
            }
            InputState::Dragging { target, .. } => {
                tracing::debug!(?target, "drag committed");
                let mut actions = vec![Action::RenderNeeded, Action::SetCursor(Cursor::Grab)];
                if matches!(target, ItemRef::Region(_)) {
                    actions.push(Action::RegionListChanged);
                }
                actions
            }
            InputState::Resizing { target, anchor, .. } => {
                tracing::debug!(?target, ?anchor, "resize committed");
                let mut actions = vec![Action::RenderNeeded, Action::SetCursor(ws.tool.cursor())];
                if matches!(target, ItemRef::Region(_)) {
                    actions.push(Action::RegionListChanged);
                }
                actions
            }
            InputState::PanningGuide { .. } => vec![Action::RenderNeeded],
        }
    }

    /// Toggle selection of the topmost item, or confirm an active crop.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        let ws = self.ws_mut();
        if ws.ui.crop_target.take().is_some() {
            tracing::debug!("crop confirmed");
            return vec![Action::RenderNeeded];
        }
        if ws.tool != Tool::Move || ws.document.is_none() {
            return Vec::new();
        }
        let hit = hit_scene(ws).item_at(screen_pt);
        ws.ui.selected = match hit {
            Some(item) if ws.ui.selected != Some(item) => Some(item),
            _ => None,
        };
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            return match key.0.as_str() {
                "=" | "+" => self.zoom_in(),
                "-" => self.zoom_out(),
                "0" => self.reset_zoom(),
                _ => Vec::new(),
            };
        }
        if key.is("Escape") {
            return self.escape();
        }
        if self.text_focus {
            return Vec::new();
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected_guide(),
            "ArrowLeft" => {
                let page = self.ws().current_page.saturating_sub(1);
                self.go_to_page(page)
            }
            "ArrowRight" => {
                let page = self.ws().current_page.saturating_add(1);
                self.go_to_page(page)
            }
            _ => Vec::new(),
        }
    }

    fn escape(&mut self) -> Vec<Action> {
        if self.ws().edit.is_open() {
            return self.cancel_edit();
        }
        if self.ws_mut().ui.crop_target.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    // --- Zoom and navigation ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let zoom = self.ws().camera.zoom() + ZOOM_STEP;
        self.set_zoom(zoom)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let zoom = self.ws().camera.zoom() - ZOOM_STEP;
        self.set_zoom(zoom)
    }

    pub fn reset_zoom(&mut self) -> Vec<Action> {
        self.set_zoom(1.0)
    }

    /// Set the zoom, clamped. Stored geometry is untouched.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        let ws = self.ws_mut();
        if !ws.camera.set_zoom(zoom) {
            return Vec::new();
        }
        ws.page_raster = None;
        tracing::debug!(zoom = ws.camera.zoom(), "zoom changed");
        vec![Action::PageRenderNeeded, Action::RenderNeeded]
    }

    /// Show a 1-indexed page. Out-of-range and same-page requests are ignored.
    pub fn go_to_page(&mut self, page: u32) -> Vec<Action> {
        let ws = self.ws_mut();
        if page == 0 || page > ws.total_pages() || page == ws.current_page {
            return Vec::new();
        }
        ws.current_page = page;
        ws.page_raster = None;
        ws.input = InputState::Idle;
        ws.ui.clear();
        vec![Action::PageRenderNeeded, Action::RenderNeeded]
    }

    /// Jump to a region's page, select it, and flash it.
    pub fn go_to_region(&mut self, index: usize) -> Vec<Action> {
        let Some((page, rect)) = self.ws().regions.get(index).map(|r| (r.page(), r.rect())) else {
            return Vec::new();
        };
        let mut actions = self.go_to_page(page);
        let ws = self.ws_mut();
        ws.ui.selected = Some(ItemRef::Region(index));
        let highlight = ws.camera.rect_to_screen(rect).inflate(HIGHLIGHT_PAD_PX);
        actions.push(Action::Highlight { rect: highlight, color: HIGHLIGHT_COLOR });
        actions.push(Action::RegionListChanged);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Region lifecycle ---

    /// Remove a text/remove region.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn delete_region(&mut self, index: usize) -> Vec<Action> {
        let ws = self.ws_mut();
        ws.regions.remove(index);
        let was_editing = ws.edit.is_open();
        ws.edit.region_removed(index);
        let edit_closed = was_editing && !ws.edit.is_open();
        ws.ui.selected = match ws.ui.selected {
            Some(ItemRef::Region(i)) if i == index => None,
            Some(ItemRef::Region(i)) if i > index => Some(ItemRef::Region(i - 1)),
            other => other,
        };
        ws.input = InputState::Idle;
        tracing::debug!(index, remaining = ws.regions.len(), "region deleted");
        let mut actions = vec![Action::RegionListChanged, Action::RenderNeeded];
        if edit_closed {
            actions.insert(0, Action::TextEntryClosed);
        }
        actions
    }

    /// Remove an image region.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn delete_image(&mut self, index: usize) -> Vec<Action> {
        let ws = self.ws_mut();
        ws.images.remove(index);
        ws.ui.selected = match ws.ui.selected {
            Some(ItemRef::Image(i)) if i == index => None,
            Some(ItemRef::Image(i)) if i > index => Some(ItemRef::Image(i - 1)),
            other => other,
        };
        ws.ui.crop_target = match ws.ui.crop_target {
            Some(i) if i == index => None,
            Some(i) if i > index => Some(i - 1),
            other => other,
        };
        ws.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    /// Enter crop mode for an image on the current page.
    pub fn begin_crop(&mut self, index: usize) -> Vec<Action> {
        let ws = self.ws_mut();
        if ws.images.get(index).is_none_or(|img| img.page != ws.current_page) {
            return Vec::new();
        }
        ws.ui.selected = Some(ItemRef::Image(index));
        ws.ui.crop_target = Some(index);
        vec![Action::RenderNeeded]
    }

    // --- Guides ---

    pub fn add_guide(&mut self, orientation: Orientation, ratio: f64) -> Vec<Action> {
        let ws = self.ws_mut();
        let guide = ws.guides.add(orientation, ratio);
        ws.ui.selected_guide = Some(guide);
        vec![Action::RenderNeeded]
    }

    fn delete_selected_guide(&mut self) -> Vec<Action> {
        let ws = self.ws_mut();
        let Some(guide) = ws.ui.selected_guide.take() else {
            return Vec::new();
        };
        ws.guides.remove(guide);
        vec![Action::RenderNeeded]
    }

    // --- Text editing ---

    /// Open the text panel on an existing text region, locking it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::TargetMissing`] if `index` is not a text region.
    pub fn begin_edit(&mut self, index: usize) -> Result<Vec<Action>, EditError> {
        let ws = self.workspaces.active_mut();
        let Some(Region::Text(region)) = ws.regions.get(index) else {
            return Err(EditError::TargetMissing(index));
        };
        let draft = region.clone();
        let session = ws.edit.open_existing(self.sessions.allocate(), index, &draft);
        if ws.ui.selected == Some(ItemRef::Region(index)) {
            ws.ui.selected = None;
        }
        Ok(vec![Action::TextEntryRequested { session, draft }, Action::RenderNeeded])
    }

    /// The draft of the open session, for panel edits (font, colour, alignment).
    pub fn draft_mut(&mut self) -> Option<&mut TextRegion> {
        self.ws_mut().edit.draft_mut()
    }

    /// Commit the open session with `text`.
    ///
    /// # Errors
    ///
    /// See [`crate::edit::EditState::commit`]; an empty text keeps the panel open.
    pub fn apply_text(&mut self, text: &str) -> Result<Vec<Action>, EditError> {
        let ws = self.ws_mut();
        match ws.edit.commit(text, &mut ws.regions) {
            Ok(index) => {
                tracing::debug!(index, "text applied");
                Ok(vec![Action::TextEntryClosed, Action::RegionListChanged, Action::RenderNeeded])
            }
            Err(e) => {
                tracing::debug!(error = %e, code = e.error_code(), "text not applied");
                Err(e)
            }
        }
    }

    pub fn cancel_edit(&mut self) -> Vec<Action> {
        if self.ws_mut().edit.cancel().is_none() {
            return Vec::new();
        }
        vec![Action::TextEntryClosed, Action::RenderNeeded]
    }

    /// Apply classifier output if `session` is still the open edit session.
    pub fn apply_style_hints(&mut self, session: u64, hints: &StyleHints) -> Vec<Action> {
        let ws = self.ws_mut();
        if !ws.edit.apply_hints(session, hints) {
            return Vec::new();
        }
        match ws.edit.session() {
            Some(s) => vec![Action::DraftUpdated { session, draft: s.draft.clone() }],
            None => Vec::new(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn region_rows(&self) -> Vec<RegionRow> {
        region_rows(&self.ws().regions, &self.ws().ui)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ItemRef> {
        self.ws().ui.selected
    }

    /// Redraw the overlay of the active workspace.
    pub fn render(&self, surface: &mut dyn Surface, factory: &dyn SurfaceFactory) {
        let ws = self.ws();
        let scene = Scene {
            camera: &ws.camera,
            page: ws.current_page,
            regions: &ws.regions,
            images: &ws.images,
            guides: &ws.guides,
            ui: &ws.ui,
            viewport: ws.viewport(),
            pending: ws.input.pending_rect(),
        };
        draw(surface, factory, &scene);
    }

    // --- Workspaces ---

    pub fn new_tab(&mut self) -> Vec<Action> {
        let shown = self.open_session_id();
        self.workspaces.new_tab();
        let mut actions = self.sync_text_panel(shown);
        actions.extend([Action::RegionListChanged, Action::RenderNeeded]);
        actions
    }

    pub fn switch_tab(&mut self, index: usize) -> Vec<Action> {
        let shown = self.open_session_id();
        if !self.workspaces.switch(index) {
            return Vec::new();
        }
        let mut actions = self.sync_text_panel(shown);
        actions.extend([Action::PageRenderNeeded, Action::RegionListChanged, Action::RenderNeeded]);
        actions
    }

    /// Close a tab. Background tabs keep their sessions; the text panel only
    /// changes when the active workspace's session does.
    pub fn close_tab(&mut self, index: usize) -> Vec<Action> {
        let shown = self.open_session_id();
        if !self.workspaces.close(index) {
            return Vec::new();
        }
        let mut actions = self.sync_text_panel(shown);
        actions.extend([Action::PageRenderNeeded, Action::RegionListChanged, Action::RenderNeeded]);
        actions
    }

    fn open_session_id(&self) -> Option<u64> {
        self.ws().edit.session().map(|s| s.id)
    }

    /// Point the text panel at the active workspace's session after the
    /// active workspace changed. `shown` is the session the panel showed.
    fn sync_text_panel(&self, shown: Option<u64>) -> Vec<Action> {
        match self.ws().edit.session() {
            Some(s) if Some(s.id) == shown => Vec::new(),
            Some(s) => vec![Action::TextEntryRequested { session: s.id, draft: s.draft.clone() }],
            None if shown.is_some() => vec![Action::TextEntryClosed],
            None => Vec::new(),
        }
    }

    // --- Async collaborators ---

    /// Load a document into the active workspace, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for a non-PDF content type or bytes the renderer
    /// rejects. The workspace is left untouched on error.
    pub async fn load_document(
        &mut self,
        renderer: &dyn PageRenderer,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Action>, LoadError> {
        check_content_type(content_type)?;
        let info = renderer.load(&bytes).await?;
        if info.page_count() == 0 {
            return Err(LoadError::NoPages);
        }

        let ws = self.ws_mut();
        ws.reset();
        ws.name = name.to_owned();
        tracing::info!(name, pages = info.page_count(), bytes = bytes.len(), "document loaded");
        ws.document = Some(LoadedDocument { name: name.to_owned(), bytes: Arc::from(bytes), info });
        Ok(vec![Action::PageRenderNeeded, Action::RegionListChanged, Action::RenderNeeded])
    }

    /// Rasterize the current page at the current zoom for sampling.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the renderer fails; the previous raster is dropped.
    pub async fn render_current_page(&mut self, renderer: &dyn PageRenderer) -> Result<Vec<Action>, RenderError> {
        let ws = self.ws_mut();
        let Some(doc) = ws.document.as_ref() else {
            return Ok(Vec::new());
        };
        let bytes = Arc::clone(&doc.bytes);
        ws.page_raster = None;
        let raster = renderer.render_page(&bytes, ws.current_page, ws.camera.zoom()).await?;
        ws.page_raster = Some(raster);
        Ok(vec![Action::RenderNeeded])
    }

    /// Export the active workspace's document with every edit applied.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingSource`] without a loaded document, or a
    /// writer error if the document cannot be opened or saved.
    pub async fn export(&self, writer: &dyn DocumentWriter, factory: &dyn SurfaceFactory) -> Result<Vec<u8>, ExportError> {
        let ws = self.ws();
        let doc = ws.document.as_ref().ok_or(ExportError::MissingSource)?;
        let job = ExportJob { source: &doc.bytes, info: &doc.info, regions: &ws.regions, images: &ws.images };
        export(writer, factory, &job).await
    }
}

// =============================================================================
// POINTER HELPERS
// =============================================================================

fn hit_scene(ws: &Workspace) -> HitScene<'_> {
    HitScene {
        camera: &ws.camera,
        page: ws.current_page,
        regions: &ws.regions,
        images: &ws.images,
        guides: &ws.guides,
        viewport: ws.viewport(),
        ui: &ws.ui,
        locked: ws.edit.locked_index(),
    }
}

fn rect_mut(ws: &mut Workspace, item: ItemRef) -> Option<&mut Rect> {
    match item {
        ItemRef::Region(i) => ws.regions.get_mut(i).map(|r| r.rect_mut()),
        ItemRef::Image(i) => ws.images.get_mut(i).map(|r| r.rect_mut()),
    }
}

fn pointer_down_move_tool(ws: &mut Workspace, screen_pt: Point, base_pt: Point) -> Vec<Action> {
    let scene = hit_scene(ws);
    let hit = scene.hit_test(screen_pt);
    let hit_rect = match hit {
        Some(Hit::Handle(item, _) | Hit::Item(item)) => scene.rect_of(item),
        _ => None,
    };

    match (hit, hit_rect) {
        (Some(Hit::Handle(target, anchor)), Some(orig)) => {
            let crop = match target {
                ItemRef::Image(i) if ws.ui.crop_target == Some(i) => ws.images.get(i).map(|img| {
                    let src = img.source_rect();
                    CropGesture { orig_crop: img.crop, scale_x: orig.width / src.width, scale_y: orig.height / src.height }
                }),
                _ => None,
            };
            let aspect_locked = anchor.is_corner() && matches!(target, ItemRef::Image(_));
            ws.input = InputState::Resizing { target, anchor, start: base_pt, orig, aspect_locked, crop };
            vec![Action::SetCursor(Cursor::Resize(anchor))]
        }
        (Some(Hit::Item(target)), Some(orig)) => {
            let offset = Point::new(base_pt.x - orig.x, base_pt.y - orig.y);
            ws.input = InputState::Dragging { target, offset };
            vec![Action::SetCursor(Cursor::Grabbing)]
        }
        (Some(Hit::Guide(guide)), _) => {
            ws.ui.selected_guide = Some(guide);
            ws.input = InputState::PanningGuide { guide };
            vec![Action::SetCursor(Cursor::for_guide(guide.orientation)), Action::RenderNeeded]
        }
        _ => {
            let had_selection = ws.ui.selected.is_some() || ws.ui.selected_guide.is_some() || ws.ui.crop_target.is_some();
            ws.ui.clear();
            if had_selection { vec![Action::RenderNeeded] } else { Vec::new() }
        }
    }
}

fn hover_cursor(ws: &Workspace, screen_pt: Point) -> Cursor {
    if ws.tool != Tool::Move {
        return ws.tool.cursor();
    }
    match hit_scene(ws).hit_test(screen_pt) {
        Some(Hit::Handle(_, anchor)) => Cursor::Resize(anchor),
        Some(Hit::Item(_)) => Cursor::Grab,
        Some(Hit::Guide(guide)) => Cursor::for_guide(guide.orientation),
        None => Cursor::Default,
    }
}

fn commit_draw(ws: &mut Workspace, sessions: &mut SessionIds, kind: DrawKind, rect: Rect) -> Vec<Action> {
    let min = kind.min_extent();
    if rect.width <= min || rect.height <= min {
        tracing::debug!(width = rect.width, height = rect.height, "draw discarded below minimum size");
        return vec![Action::RenderNeeded];
    }
    let page = ws.current_page;
    let screen_rect = ws.camera.rect_to_screen(rect);
    let background = ws
        .page_raster
        .as_ref()
        .map_or(Rgb::WHITE, |raster| dominant_background(raster, screen_rect));

    match kind {
        DrawKind::Text(text_kind) => {
            let mut draft = TextRegion {
                kind: text_kind,
                page,
                rect,
                text: String::new(),
                style: TextStyle::default(),
                background: Rgb::WHITE,
            };
            if text_kind == TextKind::Replace {
                draft.background = background;
                if let Some(raster) = &ws.page_raster {
                    draft.style.color = dominant_foreground(raster, screen_rect);
                }
            }
            let session = ws.edit.open_new(sessions.allocate(), draft.clone());
            tracing::debug!(session, kind = ?text_kind, "text draft opened");

            let mut actions = vec![Action::TextEntryRequested { session, draft }, Action::RenderNeeded];
            if text_kind == TextKind::Replace {
                if let Some(raster) = &ws.page_raster {
                    match style_request(session, raster, screen_rect, rect) {
                        Ok(request) => actions.push(Action::StyleInferenceRequested(request)),
                        Err(e) => tracing::debug!(error = %e, code = e.error_code(), "style request skipped"),
                    }
                }
            }
            actions
        }
        DrawKind::Remove => {
            let index = ws.regions.push(Region::Remove(RemoveRegion { page, rect, background }));
            tracing::debug!(index, "remove region committed");
            vec![Action::RegionListChanged, Action::RenderNeeded]
        }
        DrawKind::Image => {
            let Some(source) = ws.staged_image.take() else {
                return vec![Action::RenderNeeded];
            };
            let placed = letterbox(rect, f64::from(source.width()), f64::from(source.height()));
            let index = ws.images.push(ImageRegion::new(page, placed, source));
            tracing::debug!(index, "image placed");
            ws.tool = Tool::Move;
            vec![Action::SetCursor(Tool::Move.cursor()), Action::RenderNeeded]
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Fit an image of the given intrinsic size inside `frame`, centered, keeping its ratio.
#[must_use]
pub fn letterbox(frame: Rect, width: f64, height: f64) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return frame;
    }
    let aspect = width / height;
    if aspect > frame.width / frame.height {
        let h = frame.width / aspect;
        Rect::new(frame.x, frame.y + (frame.height - h) / 2.0, frame.width, h)
    } else {
        let w = frame.height * aspect;
        Rect::new(frame.x + (frame.width - w) / 2.0, frame.y, w, frame.height)
    }
}

/// Resize `orig` by dragging `anchor` by `(dx, dy)`, keeping both sides at least
/// [`MIN_RESIZE`]. With an aspect ratio, corner drags follow the dominant axis.
#[must_use]
pub fn resize_rect(orig: Rect, anchor: ResizeAnchor, dx: f64, dy: f64, aspect: Option<f64>) -> Rect {
    if let Some(aspect) = aspect.filter(|a| anchor.is_corner() && *a > 0.0) {
        let grow_x = if anchor.east() { dx } else { -dx };
        let grow_y = if anchor.south() { dy } else { -dy };
        let (w, h) = if dx.abs() >= dy.abs() {
            let w = orig.width + grow_x;
            (w, w / aspect)
        } else {
            let h = orig.height + grow_y;
            (h * aspect, h)
        };
        // Below the minimum, snap to the smallest box with the same ratio.
        let (w, h) = if w < MIN_RESIZE || h < MIN_RESIZE {
            if aspect >= 1.0 { (MIN_RESIZE * aspect, MIN_RESIZE) } else { (MIN_RESIZE, MIN_RESIZE / aspect) }
        } else {
            (w, h)
        };
        let x = if anchor.west() { orig.right() - w } else { orig.x };
        let y = if anchor.north() { orig.bottom() - h } else { orig.y };
        return Rect::new(x, y, w, h);
    }

    let mut r = orig;
    if anchor.east() {
        r.width = (orig.width + dx).max(MIN_RESIZE);
    }
    if anchor.west() {
        r.width = (orig.width - dx).max(MIN_RESIZE);
        r.x = orig.right() - r.width;
    }
    if anchor.south() {
        r.height = (orig.height + dy).max(MIN_RESIZE);
    }
    if anchor.north() {
        r.height = (orig.height - dy).max(MIN_RESIZE);
        r.y = orig.bottom() - r.height;
    }
    r
}

/// Crop-mode resize: each dragged edge moves the box and the matching inset
/// together, at the scale captured when the gesture began.
///
/// Returns `None` (leave everything as is) when the move would empty the
/// visible window or shrink the box below [`MIN_RESIZE`].
#[must_use]
pub fn crop_resize(
    orig: Rect,
    anchor: ResizeAnchor,
    dx: f64,
    dy: f64,
    gesture: &CropGesture,
    original_width: f64,
    original_height: f64,
) -> Option<(Rect, CropWindow)> {
    let base = gesture.orig_crop;
    let mut crop = base;
    let mut r = orig;

    if anchor.east() {
        crop.right = (base.right - dx / gesture.scale_x).max(0.0);
        r.width = orig.width + (base.right - crop.right) * gesture.scale_x;
    }
    if anchor.west() {
        crop.left = (base.left + dx / gesture.scale_x).max(0.0);
        r.width = orig.width - (crop.left - base.left) * gesture.scale_x;
        r.x = orig.right() - r.width;
    }
    if anchor.south() {
        crop.bottom = (base.bottom - dy / gesture.scale_y).max(0.0);
        r.height = orig.height + (base.bottom - crop.bottom) * gesture.scale_y;
    }
    if anchor.north() {
        crop.top = (base.top + dy / gesture.scale_y).max(0.0);
        r.height = orig.height - (crop.top - base.top) * gesture.scale_y;
        r.y = orig.bottom() - r.height;
    }

    let valid = gesture.scale_x.is_finite()
        && gesture.scale_y.is_finite()
        && crop.fits(original_width, original_height)
        && r.width >= MIN_RESIZE
        && r.height >= MIN_RESIZE;
    valid.then_some((r, crop))
}
