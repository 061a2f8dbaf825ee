//! Region list view-model.
//!
//! The host's side list is a pure function of the region store and the current
//! selection; binding rows to widgets is the host's business.

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;

use serde::Serialize;

use crate::doc::{Placed, Region, RegionStore, TextKind};
use crate::input::{ItemRef, UiState};

/// Label shown for a region with no text.
pub const EMPTY_LABEL: &str = "Empty selection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Replace,
    Add,
    Remove,
}

/// One row of the region list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    /// Store index; valid until the next mutation.
    pub index: usize,
    pub kind: RowKind,
    pub label: String,
    pub page: u32,
    /// Rounded font size; `None` for remove regions.
    pub font_size: Option<u32>,
    pub selected: bool,
}

/// Build one row per text/remove region in store order.
#[must_use]
pub fn region_rows(regions: &RegionStore<Region>, ui: &UiState) -> Vec<RegionRow> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let (kind, label, font_size) = match region {
                Region::Text(t) => {
                    let kind = match t.kind {
                        TextKind::Replace => RowKind::Replace,
                        TextKind::Add => RowKind::Add,
                    };
                    let label = if t.text.trim().is_empty() { EMPTY_LABEL.to_owned() } else { t.text.clone() };
                    (kind, label, Some(t.style.font_size.round().max(0.0) as u32))
                }
                Region::Remove(_) => (RowKind::Remove, EMPTY_LABEL.to_owned(), None),
            };
            RegionRow {
                index,
                kind,
                label,
                page: region.page(),
                font_size,
                selected: ui.selected == Some(ItemRef::Region(index)),
            }
        })
        .collect()
}
