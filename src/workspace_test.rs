use std::sync::Arc;

use super::*;
use crate::camera::Rect;
use crate::color::Rgb;
use crate::doc::RemoveRegion;
use crate::page::DocumentInfo;

fn loaded(ws: &mut Workspace) {
    ws.document = Some(LoadedDocument {
        name: "invoice.pdf".into(),
        bytes: Arc::from(&b"%PDF-1.7"[..]),
        info: DocumentInfo { page_sizes: vec![Size::new(600.0, 800.0), Size::new(400.0, 500.0)] },
    });
    ws.name = "invoice.pdf".into();
    ws.regions.push(Region::Remove(RemoveRegion { page: 1, rect: Rect::new(0.0, 0.0, 20.0, 20.0), background: Rgb::WHITE }));
}

#[test]
fn fresh_workspace_is_untitled_and_empty() {
    let ws = Workspace::new();
    assert_eq!(ws.name, UNTITLED);
    assert_eq!(ws.total_pages(), 0);
    assert_eq!(ws.viewport(), Size::default());
    assert_eq!(ws.current_page, 1);
}

#[test]
fn viewport_follows_page_and_zoom() {
    let mut ws = Workspace::new();
    loaded(&mut ws);
    assert_eq!(ws.total_pages(), 2);
    ws.camera.set_zoom(1.5);
    assert_eq!(ws.viewport(), Size::new(900.0, 1200.0));
    ws.current_page = 2;
    assert_eq!(ws.page_size(), Size::new(400.0, 500.0));
}

#[test]
fn reset_keeps_identity() {
    let mut ws = Workspace::new();
    let id = ws.id;
    loaded(&mut ws);
    ws.reset();
    assert_eq!(ws.id, id);
    assert_eq!(ws.name, UNTITLED);
    assert!(ws.document.is_none());
    assert!(ws.regions.is_empty());
}

#[test]
fn new_tab_becomes_active() {
    let mut tabs = Workspaces::new();
    assert_eq!(tabs.len(), 1);
    let index = tabs.new_tab();
    assert_eq!(index, 1);
    assert_eq!(tabs.active_index(), 1);
    assert!(tabs.switch(0));
    assert!(!tabs.switch(5));
    assert_eq!(tabs.active_index(), 0);
}

#[test]
fn closing_last_tab_resets_it() {
    let mut tabs = Workspaces::new();
    let id = tabs.active().id;
    loaded(tabs.active_mut());

    assert!(tabs.close(0));
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs.active().id, id);
    assert_eq!(tabs.active().name, UNTITLED);
    assert!(tabs.active().document.is_none());
    assert!(tabs.active().regions.is_empty());
}

#[test]
fn closing_before_active_shifts_active() {
    let mut tabs = Workspaces::new();
    tabs.new_tab();
    tabs.new_tab();
    let active_id = tabs.active().id;
    assert!(tabs.close(0));
    assert_eq!(tabs.active_index(), 1);
    assert_eq!(tabs.active().id, active_id);
}

#[test]
fn closing_active_last_tab_moves_left() {
    let mut tabs = Workspaces::new();
    tabs.new_tab();
    assert!(tabs.close(1));
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs.active_index(), 0);
    assert!(!tabs.close(3));
}

#[test]
fn closing_active_middle_tab_selects_next() {
    let mut tabs = Workspaces::new();
    tabs.new_tab();
    tabs.new_tab();
    let next = tabs.iter().nth(2).unwrap().id;
    tabs.switch(1);
    tabs.close(1);
    assert_eq!(tabs.active_index(), 1);
    assert_eq!(tabs.active().id, next);
}
