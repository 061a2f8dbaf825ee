//! Export pipeline.
//!
//! Walks both stores in insertion order and replays each item onto the
//! original document through a [`DocumentWriter`]. Base coordinates are
//! scaled by the ratio of each page's native size to its base viewport and
//! flipped vertically, because export space grows upward from the page bottom.
//!
//! Text goes through the same [`layout_block`] the compositor uses, measured
//! with the writer's standard-font metrics. Pixelated text is rasterized by
//! [`rasterize_text`] and embedded as an image, so the blocks match the preview.
//!
//! A failure on one item is logged and skipped; only opening or saving the
//! document aborts the export.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use image::RgbaImage;
use image::imageops;

use crate::camera::{Rect, Size};
use crate::color::Rgb;
use crate::consts::TEXT_MARGIN;
use crate::doc::{ImageRegion, Placed, Region, RegionStore, TextRegion};
use crate::error::ErrorCode;
use crate::page::DocumentInfo;
use crate::pixelate::rasterize_text;
use crate::render::SurfaceFactory;
use crate::text_layout::{FontSpec, TextMeasure, layout_block, sanitize_for_export};

/// Errors from the document writer.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("document could not be opened: {0}")]
    Open(String),

    #[error("page {0} does not exist")]
    NoSuchPage(u32),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("serialization failed: {0}")]
    Save(String),
}

impl ErrorCode for WriterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Open(_) => "E_WRITER_OPEN",
            Self::NoSuchPage(_) => "E_WRITER_PAGE",
            Self::Draw(_) => "E_WRITER_DRAW",
            Self::Image(_) => "E_WRITER_IMAGE",
            Self::Save(_) => "E_WRITER_SAVE",
        }
    }
}

/// Errors that abort an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No document is loaded in the workspace.
    #[error("no source document loaded")]
    MissingSource,

    #[error(transparent)]
    Writer(#[from] WriterError),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSource => "E_MISSING_SOURCE",
            Self::Writer(e) => e.error_code(),
        }
    }
}

/// Fixed font family available to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    #[must_use]
    pub fn for_style(bold: bool) -> Self {
        if bold { Self::HelveticaBold } else { Self::Helvetica }
    }
}

/// One line of text in export space. `y` is the baseline measured up from the page bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub font: StandardFont,
    pub color: Rgb,
}

/// An open document being modified for export. Rectangles are bottom-up page coordinates.
pub trait ExportDocument: Send {
    fn page_count(&self) -> u32;

    /// Native size of a 1-indexed page.
    fn page_size(&self, page: u32) -> Option<Size>;

    fn text_width(&self, font: StandardFont, size: f64, text: &str) -> f64;

    /// # Errors
    ///
    /// Returns [`WriterError`] if the page is missing or the primitive is rejected.
    fn draw_rectangle(&mut self, page: u32, rect: Rect, color: Rgb) -> Result<(), WriterError>;

    /// # Errors
    ///
    /// Returns [`WriterError`] if the page is missing or the text cannot be encoded.
    fn draw_text(&mut self, page: u32, run: &TextRun) -> Result<(), WriterError>;

    /// # Errors
    ///
    /// Returns [`WriterError`] if the page is missing or the image cannot be embedded.
    fn draw_image(&mut self, page: u32, image: &RgbaImage, rect: Rect) -> Result<(), WriterError>;

    /// Serialize the modified document.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::Save`] if serialization fails.
    fn save(&mut self) -> Result<Vec<u8>, WriterError>;
}

/// External document writer.
#[async_trait::async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Open the source document bytes for modification.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::Open`] if the bytes cannot be parsed.
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn ExportDocument>, WriterError>;
}

/// Base-to-export mapping for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMapping {
    pub scale_x: f64,
    pub scale_y: f64,
    pub page_height: f64,
}

impl PageMapping {
    /// Mapping from a page's base viewport to its native size.
    #[must_use]
    pub fn new(viewport: Size, native: Size) -> Self {
        Self {
            scale_x: native.width / viewport.width,
            scale_y: native.height / viewport.height,
            page_height: native.height,
        }
    }

    /// Scaled but unflipped rectangle (top-down export space).
    #[must_use]
    pub fn scale(&self, base: Rect) -> Rect {
        Rect::new(base.x * self.scale_x, base.y * self.scale_y, base.width * self.scale_x, base.height * self.scale_y)
    }

    /// Scaled and flipped rectangle: `y = pageHeight - y*sy - h*sy`.
    #[must_use]
    pub fn to_export(&self, base: Rect) -> Rect {
        let r = self.scale(base);
        Rect::new(r.x, self.page_height - r.y - r.height, r.width, r.height)
    }
}

/// Standard-font metrics of the open document.
struct WriterMetrics<'a> {
    doc: &'a dyn ExportDocument,
    font: StandardFont,
}

impl TextMeasure for WriterMetrics<'_> {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        self.doc.text_width(self.font, font.size, text)
    }
}

/// Inputs of one export run.
pub struct ExportJob<'a> {
    pub source: &'a [u8],
    pub info: &'a DocumentInfo,
    pub regions: &'a RegionStore<Region>,
    pub images: &'a RegionStore<ImageRegion>,
}

/// Replay every region and image onto the source document and serialize it.
///
/// # Errors
///
/// Returns [`ExportError::Writer`] if the document cannot be opened or saved.
/// Individual item failures are logged and skipped.
pub async fn export(
    writer: &dyn DocumentWriter,
    factory: &dyn SurfaceFactory,
    job: &ExportJob<'_>,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = writer.open(job.source).await?;

    let mut written = 0usize;
    for (index, region) in job.regions.iter().enumerate() {
        match write_region(doc.as_mut(), factory, job.info, region) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!(index, error = %e, code = e.error_code(), "skipping region on export"),
        }
    }
    for (index, image) in job.images.iter().enumerate() {
        match write_image(doc.as_mut(), job.info, image) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!(index, error = %e, code = e.error_code(), "skipping image on export"),
        }
    }

    let bytes = doc.save()?;
    tracing::info!(items = written, bytes = bytes.len(), "document exported");
    Ok(bytes)
}

fn mapping_for(doc: &dyn ExportDocument, info: &DocumentInfo, page: u32) -> Result<PageMapping, WriterError> {
    let native = doc.page_size(page).ok_or(WriterError::NoSuchPage(page))?;
    let viewport = info.page_size(page).ok_or(WriterError::NoSuchPage(page))?;
    Ok(PageMapping::new(viewport, native))
}

fn write_region(
    doc: &mut dyn ExportDocument,
    factory: &dyn SurfaceFactory,
    info: &DocumentInfo,
    region: &Region,
) -> Result<(), WriterError> {
    let page = region.page();
    let mapping = mapping_for(doc, info, page)?;
    let rect = region.rect();

    if region.fills_background() {
        doc.draw_rectangle(page, mapping.to_export(rect), region.background())?;
    }
    match region {
        Region::Text(text) => write_text(doc, factory, &mapping, text),
        Region::Remove(_) => Ok(()),
    }
}

fn write_text(
    doc: &mut dyn ExportDocument,
    factory: &dyn SurfaceFactory,
    mapping: &PageMapping,
    region: &TextRegion,
) -> Result<(), WriterError> {
    if region.text.trim().is_empty() {
        return Ok(());
    }

    if region.style.pixelate.is_active() {
        let size = Size::new(region.rect.width, region.rect.height);
        if let Some(raster) = rasterize_text(factory, region, size, 1.0) {
            doc.draw_image(region.page, &raster, mapping.to_export(region.rect))?;
        }
        return Ok(());
    }

    let text = sanitize_for_export(&region.text);
    let standard = StandardFont::for_style(region.style.weight.is_bold());
    let font = FontSpec::from_style(&region.style, mapping.scale_y);
    let lines = {
        let metrics = WriterMetrics { doc: &*doc, font: standard };
        layout_block(
            &metrics,
            &font,
            &text,
            mapping.scale(region.rect),
            region.style.align,
            TEXT_MARGIN * mapping.scale_x,
        )
    };

    for line in lines {
        let run = TextRun {
            text: line.text,
            x: line.x,
            y: mapping.page_height - line.baseline,
            size: font.size,
            font: standard,
            color: region.style.color,
        };
        doc.draw_text(region.page, &run)?;
    }
    Ok(())
}

/// The visible crop window of an image's source raster.
#[must_use]
pub fn cropped_source(image: &ImageRegion) -> Option<RgbaImage> {
    let src = image.source_rect();
    let x = src.x.round().max(0.0) as u32;
    let y = src.y.round().max(0.0) as u32;
    let w = src.width.round() as u32;
    let h = src.height.round() as u32;
    if w == 0 || h == 0 || x + w > image.source.width() || y + h > image.source.height() {
        return None;
    }
    Some(imageops::crop_imm(&*image.source, x, y, w, h).to_image())
}

fn write_image(doc: &mut dyn ExportDocument, info: &DocumentInfo, image: &ImageRegion) -> Result<(), WriterError> {
    let mapping = mapping_for(doc, info, image.page)?;
    let raster = cropped_source(image).ok_or_else(|| WriterError::Image("empty crop window".into()))?;
    doc.draw_image(image.page, &raster, mapping.to_export(image.rect))
}
