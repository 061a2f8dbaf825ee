//! Page renderer seam.
//!
//! Document parsing and page rasterization belong to an external renderer.
//! The engine only needs per-page base sizes (the viewport at zoom 1) and an
//! RGBA raster of the current page at the current zoom.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use image::RgbaImage;

use crate::camera::Size;
use crate::error::ErrorCode;

/// The only content type the editor accepts.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Errors raised while loading a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// The renderer could not parse the bytes.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("document has no pages")]
    NoPages,
}

impl ErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedType(_) => "E_UNSUPPORTED_TYPE",
            Self::Corrupt(_) => "E_CORRUPT_DOCUMENT",
            Self::NoPages => "E_NO_PAGES",
        }
    }
}

/// Errors raised while rasterizing a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} out of range (document has {total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("page render failed: {0}")]
    Backend(String),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PageOutOfRange { .. } => "E_PAGE_OUT_OF_RANGE",
            Self::Backend(_) => "E_PAGE_RENDER",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// What the renderer reports about a loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    /// Base viewport size (zoom 1) of each page, in page order.
    pub page_sizes: Vec<Size>,
}

impl DocumentInfo {
    #[must_use]
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.page_sizes.len()).unwrap_or(u32::MAX)
    }

    /// Base size of a 1-indexed page.
    #[must_use]
    pub fn page_size(&self, page: u32) -> Option<Size> {
        let index = usize::try_from(page.checked_sub(1)?).unwrap_or(usize::MAX);
        self.page_sizes.get(index).copied()
    }
}

/// A document held by a workspace: its name, raw bytes, and page metadata.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub bytes: std::sync::Arc<[u8]>,
    pub info: DocumentInfo,
}

/// Reject anything that is not a PDF before the renderer sees it.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedType`] for any other content type.
pub fn check_content_type(content_type: &str) -> Result<(), LoadError> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        Ok(())
    } else {
        Err(LoadError::UnsupportedType(content_type.to_owned()))
    }
}

/// External page renderer.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    /// Parse a document and report its page sizes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the bytes cannot be parsed.
    async fn load(&self, bytes: &[u8]) -> Result<DocumentInfo, LoadError>;

    /// Rasterize a 1-indexed page at `zoom`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the page does not exist or rendering fails.
    async fn render_page(&self, bytes: &[u8], page: u32, zoom: f64) -> Result<RgbaImage, RenderError>;
}
