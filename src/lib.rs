//! Editing core for annotating PDF documents on a canvas.
//!
//! The crate owns everything between raw host input and the finished PDF:
//! translating pointer and keyboard events into region edits, keeping the
//! zoom camera, hit-testing, sampling page colours under a region, laying out
//! and drawing the overlay, and replaying regions into a new document on
//! export. The host layer wires its UI events to [`engine::EngineCore`] and
//! carries out the returned [`engine::Action`]s. PDF parsing, rasterization
//! and writing sit behind the [`page::PageRenderer`] and
//! [`export::DocumentWriter`] traits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Input dispatch and the testable [`engine::EngineCore`] |
//! | [`workspace`] | Per-tab editing state and the tab list |
//! | [`doc`] | Region, image and guide types with their stores |
//! | [`edit`] | Text-entry sessions and snapshot requests |
//! | [`camera`] | Zoom camera and coordinate conversions |
//! | [`input`] | Tools, input events, and the gesture state machine |
//! | [`hit`] | Hit-testing against regions, images, handles and guides |
//! | [`sample`] | Dominant colour sampling from the page raster |
//! | [`text_layout`] | Word wrapping and line placement |
//! | [`pixelate`] | Pixelated text preview |
//! | [`render`] | Overlay rendering onto a host surface |
//! | [`page`] | Document loading and page rasterization contracts |
//! | [`export`] | Replaying regions into the output document |
//! | [`classify`] | Remote font-style inference |
//! | [`list`] | Region list view-model |
//! | [`color`] | RGB colour parsing and brightness |
//! | [`error`] | Shared error-code trait |
//! | [`consts`] | Shared numeric constants and palette |

pub mod camera;
pub mod classify;
pub mod color;
pub mod consts;
pub mod doc;
pub mod edit;
pub mod engine;
pub mod error;
pub mod export;
pub mod hit;
pub mod input;
pub mod list;
pub mod page;
pub mod pixelate;
pub mod render;
pub mod sample;
pub mod text_layout;
pub mod workspace;

#[cfg(test)]
mod testkit;
