//! In-crate fakes for the external collaborators.
//!
//! `RecordingSurface` logs every call and also rasterizes into a real RGBA
//! buffer (text as solid glyph cells with a fixed advance of half an em), so
//! pixel-level tests are deterministic.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};

use crate::camera::{Point, Rect, Size};
use crate::classify::{ClassifyError, StyleClassifier, StyleHints, StyleRequest};
use crate::color::Rgb;
use crate::export::{DocumentWriter, ExportDocument, StandardFont, TextRun, WriterError};
use crate::page::{DocumentInfo, LoadError, PageRenderer, RenderError};
use crate::render::{Surface, SurfaceFactory};
use crate::text_layout::{FontSpec, TextMeasure};

/// Glyph advance as a fraction of the font size.
pub const ADVANCE_EM: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect { rect: Rect, color: Rgb },
    StrokeRect { rect: Rect, color: Rgb, dashed: bool },
    Line { from: Point, to: Point, color: Rgb },
    Text { text: String, x: f64, baseline: f64, size: f64, color: Rgb },
    Image { src: Rect, dst: Rect, smoothing: bool },
}

pub struct RecordingSurface {
    pub pixels: RgbaImage,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::new(width, height), ops: Vec::new() }
    }

    pub fn texts(&self) -> Vec<&DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).collect()
    }

    fn paint(&mut self, rect: Rect, px: [u8; 4]) {
        let rect = rect.normalized();
        let w = f64::from(self.pixels.width());
        let h = f64::from(self.pixels.height());
        let x0 = rect.x.round().clamp(0.0, w) as u32;
        let y0 = rect.y.round().clamp(0.0, h) as u32;
        let x1 = rect.right().round().clamp(0.0, w) as u32;
        let y1 = rect.bottom().round().clamp(0.0, h) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put_pixel(x, y, Rgba(px));
            }
        }
    }
}

fn opaque(color: Rgb) -> [u8; 4] {
    [color.r, color.g, color.b, 255]
}

impl TextMeasure for RecordingSurface {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        text.chars().count() as f64 * font.size * ADVANCE_EM
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect { rect, color });
        self.paint(rect, opaque(color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, _line_width: f64, dash: Option<f64>) {
        self.ops.push(DrawOp::StrokeRect { rect, color, dashed: dash.is_some() });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, _line_width: f64) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn fill_text(&mut self, text: &str, x: f64, baseline: f64, font: &FontSpec, color: Rgb) {
        self.ops.push(DrawOp::Text { text: text.to_owned(), x, baseline, size: font.size, color });
        let advance = font.size * ADVANCE_EM;
        let cap = font.size * 0.7;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let cell = Rect::new(x + i as f64 * advance, baseline - cap, advance * 0.8, cap);
            self.paint(cell, opaque(color));
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, src: Rect, dst: Rect, smoothing: bool) {
        self.ops.push(DrawOp::Image { src, dst, smoothing });
        if dst.width <= 0.0 || dst.height <= 0.0 {
            return;
        }
        let (w, h) = (self.pixels.width(), self.pixels.height());
        for y in 0..h {
            for x in 0..w {
                let (fx, fy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                if !dst.contains(Point::new(fx, fy)) {
                    continue;
                }
                let sx = src.x + (fx - dst.x) / dst.width * src.width;
                let sy = src.y + (fy - dst.y) / dst.height * src.height;
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                let (sx, sy) = (sx as u32, sy as u32);
                if sx < image.width() && sy < image.height() {
                    let px = *image.get_pixel(sx, sy);
                    if px.0[3] > 0 {
                        self.pixels.put_pixel(x, y, px);
                    }
                }
            }
        }
    }

    fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }
}

/// Hands out recording surfaces and remembers their sizes.
#[derive(Default)]
pub struct FakeFactory {
    pub created: RefCell<Vec<(u32, u32)>>,
}

impl SurfaceFactory for FakeFactory {
    fn create(&self, width: u32, height: u32) -> Box<dyn Surface> {
        self.created.borrow_mut().push((width, height));
        Box::new(RecordingSurface::new(width, height))
    }
}

// =============================================================
// Page renderer
// =============================================================

/// Renders every page as a white sheet with optional painted patches.
pub struct FakeRenderer {
    pub page_sizes: Vec<Size>,
    /// Base-space patches painted on every page.
    pub patches: Vec<(Rect, [u8; 4])>,
}

impl FakeRenderer {
    pub fn new(page_sizes: Vec<Size>) -> Self {
        Self { page_sizes, patches: Vec::new() }
    }

    pub fn with_patch(mut self, rect: Rect, px: [u8; 4]) -> Self {
        self.patches.push((rect, px));
        self
    }
}

#[async_trait::async_trait]
impl PageRenderer for FakeRenderer {
    async fn load(&self, bytes: &[u8]) -> Result<DocumentInfo, LoadError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(LoadError::Corrupt("missing %PDF header".into()));
        }
        if self.page_sizes.is_empty() {
            return Err(LoadError::NoPages);
        }
        Ok(DocumentInfo { page_sizes: self.page_sizes.clone() })
    }

    async fn render_page(&self, _bytes: &[u8], page: u32, zoom: f64) -> Result<RgbaImage, RenderError> {
        let total = self.page_sizes.len() as u32;
        let Some(size) = page.checked_sub(1).and_then(|i| self.page_sizes.get(i as usize)) else {
            return Err(RenderError::PageOutOfRange { page, total });
        };
        let mut surface = RecordingSurface::new((size.width * zoom).round() as u32, (size.height * zoom).round() as u32);
        surface.paint(Rect::new(0.0, 0.0, size.width * zoom, size.height * zoom), [255, 255, 255, 255]);
        for (rect, px) in &self.patches {
            surface.paint(Rect::new(rect.x * zoom, rect.y * zoom, rect.width * zoom, rect.height * zoom), *px);
        }
        Ok(surface.pixels)
    }
}

// =============================================================
// Document writer
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum WriterOp {
    Rectangle { page: u32, rect: Rect, color: Rgb },
    Text { page: u32, run: TextRun },
    Image { page: u32, width: u32, height: u32, rect: Rect },
}

/// Records primitives into a shared log. Pages listed in `failing_pages`
/// reject rectangle draws.
#[derive(Default, Clone)]
pub struct FakeWriter {
    pub page_sizes: Vec<Size>,
    pub failing_pages: Vec<u32>,
    pub log: Arc<Mutex<Vec<WriterOp>>>,
}

impl FakeWriter {
    pub fn new(page_sizes: Vec<Size>) -> Self {
        Self { page_sizes, ..Self::default() }
    }

    pub fn ops(&self) -> Vec<WriterOp> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentWriter for FakeWriter {
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn ExportDocument>, WriterError> {
        if bytes.is_empty() {
            return Err(WriterError::Open("empty input".into()));
        }
        Ok(Box::new(FakeDocument { writer: self.clone() }))
    }
}

struct FakeDocument {
    writer: FakeWriter,
}

impl FakeDocument {
    fn record(&self, page: u32, op: WriterOp) -> Result<(), WriterError> {
        if page == 0 || page as usize > self.writer.page_sizes.len() {
            return Err(WriterError::NoSuchPage(page));
        }
        match self.writer.log.lock() {
            Ok(mut log) => {
                log.push(op);
                Ok(())
            }
            Err(e) => Err(WriterError::Draw(e.to_string())),
        }
    }
}

impl ExportDocument for FakeDocument {
    fn page_count(&self) -> u32 {
        self.writer.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Option<Size> {
        page.checked_sub(1).and_then(|i| self.writer.page_sizes.get(i as usize)).copied()
    }

    fn text_width(&self, _font: StandardFont, size: f64, text: &str) -> f64 {
        text.chars().count() as f64 * size * ADVANCE_EM
    }

    fn draw_rectangle(&mut self, page: u32, rect: Rect, color: Rgb) -> Result<(), WriterError> {
        if self.writer.failing_pages.contains(&page) {
            return Err(WriterError::Draw("rectangle rejected".into()));
        }
        self.record(page, WriterOp::Rectangle { page, rect, color })
    }

    fn draw_text(&mut self, page: u32, run: &TextRun) -> Result<(), WriterError> {
        self.record(page, WriterOp::Text { page, run: run.clone() })
    }

    fn draw_image(&mut self, page: u32, image: &RgbaImage, rect: Rect) -> Result<(), WriterError> {
        self.record(page, WriterOp::Image { page, width: image.width(), height: image.height(), rect })
    }

    fn save(&mut self) -> Result<Vec<u8>, WriterError> {
        Ok(b"%PDF-fake".to_vec())
    }
}

// =============================================================
// Style classifier
// =============================================================

/// Answers every request with the same hints, or fails when `hints` is `None`.
#[derive(Default)]
pub struct FakeClassifier {
    pub hints: Option<StyleHints>,
    pub requests: Mutex<Vec<u64>>,
}

#[async_trait::async_trait]
impl StyleClassifier for FakeClassifier {
    async fn classify(&self, request: &StyleRequest) -> Result<StyleHints, ClassifyError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.session);
        }
        self.hints.clone().ok_or(ClassifyError::EmptyResponse)
    }

    async fn probe(&self) -> Result<String, ClassifyError> {
        Ok("Merhaba".into())
    }
}
