#![allow(clippy::float_cmp)]

use std::sync::Arc;

use super::*;
use crate::doc::{CropWindow, FontWeight, PixelateLevel, RemoveRegion, TextAlign, TextKind, TextStyle};
use crate::testkit::{FakeFactory, FakeWriter, WriterOp};

/// Base viewport 600x800; native page 300x400 (half scale).
fn info() -> DocumentInfo {
    DocumentInfo { page_sizes: vec![Size::new(600.0, 800.0), Size::new(600.0, 800.0)] }
}

fn writer() -> FakeWriter {
    FakeWriter::new(vec![Size::new(300.0, 400.0), Size::new(300.0, 400.0)])
}

fn text(kind: TextKind, rect: Rect, body: &str, style: TextStyle) -> Region {
    Region::Text(TextRegion { kind, page: 1, rect, text: body.into(), style, background: Rgb::new(240, 240, 240) })
}

async fn run(writer: &FakeWriter, regions: &RegionStore<Region>, images: &RegionStore<ImageRegion>) -> Vec<u8> {
    let info = info();
    let job = ExportJob { source: b"%PDF-1.7", info: &info, regions, images };
    export(writer, &FakeFactory::default(), &job).await.unwrap()
}

// =============================================================
// Mapping
// =============================================================

#[test]
fn mapping_flips_vertically() {
    let m = PageMapping::new(Size::new(600.0, 800.0), Size::new(612.0, 792.0));
    let r = m.to_export(Rect::new(100.0, 100.0, 200.0, 50.0));
    let sx = 612.0 / 600.0;
    let sy = 792.0 / 800.0;
    assert!((r.x - 100.0 * sx).abs() < 1e-9);
    assert!((r.y - (792.0 - 100.0 * sy - 50.0 * sy)).abs() < 1e-9);
    assert!((r.width - 200.0 * sx).abs() < 1e-9);
    assert!((r.height - 50.0 * sy).abs() < 1e-9);
}

#[test]
fn standard_font_by_weight() {
    assert_eq!(StandardFont::for_style(FontWeight::Bold.is_bold()), StandardFont::HelveticaBold);
    assert_eq!(StandardFont::for_style(FontWeight::Semibold.is_bold()), StandardFont::Helvetica);
}

// =============================================================
// Pipeline
// =============================================================

#[tokio::test]
async fn replace_region_emits_rectangle_before_text() {
    let w = writer();
    let mut regions = RegionStore::new();
    regions.push(text(TextKind::Replace, Rect::new(100.0, 100.0, 200.0, 50.0), "Hello", TextStyle::default()));
    let bytes = run(&w, &regions, &RegionStore::new()).await;
    assert_eq!(bytes, b"%PDF-fake");

    let ops = w.ops();
    assert_eq!(ops.len(), 2);
    assert_eq!(
        ops[0],
        WriterOp::Rectangle { page: 1, rect: Rect::new(50.0, 325.0, 100.0, 25.0), color: Rgb::new(240, 240, 240) }
    );
    let WriterOp::Text { page, run: line } = &ops[1] else {
        panic!("expected text, got {:?}", ops[1]);
    };
    assert_eq!(*page, 1);
    assert_eq!(line.text, "Hello");
    assert_eq!(line.size, 7.0);
    assert_eq!(line.font, StandardFont::Helvetica);
    // Top-down layout: rect y 50..75, one 9.8 line centered, glyphs 7.35 below its top.
    assert!((line.y - (400.0 - (50.0 + (25.0 - 9.8) / 2.0 + 7.35))).abs() < 1e-9);
    assert_eq!(line.x, 52.5);
}

#[tokio::test]
async fn add_region_has_no_rectangle() {
    let w = writer();
    let mut regions = RegionStore::new();
    regions.push(text(TextKind::Add, Rect::new(0.0, 0.0, 200.0, 50.0), "Hi", TextStyle::default()));
    run(&w, &regions, &RegionStore::new()).await;
    let ops = w.ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], WriterOp::Text { .. }));
}

#[tokio::test]
async fn remove_region_is_a_rectangle_only() {
    let w = writer();
    let mut regions = RegionStore::new();
    regions.push(Region::Remove(RemoveRegion { page: 2, rect: Rect::new(0.0, 0.0, 60.0, 40.0), background: Rgb::WHITE }));
    run(&w, &regions, &RegionStore::new()).await;
    assert_eq!(w.ops(), vec![WriterOp::Rectangle { page: 2, rect: Rect::new(0.0, 380.0, 30.0, 20.0), color: Rgb::WHITE }]);
}

#[tokio::test]
async fn text_is_sanitized_and_aligned() {
    let w = writer();
    let mut regions = RegionStore::new();
    let style = TextStyle { align: TextAlign::Right, weight: FontWeight::Extrabold, ..TextStyle::default() };
    regions.push(text(TextKind::Add, Rect::new(0.0, 0.0, 200.0, 50.0), "Şeker", style));
    run(&w, &regions, &RegionStore::new()).await;
    let ops = w.ops();
    let WriterOp::Text { run: line, .. } = &ops[0] else {
        panic!("expected text");
    };
    assert_eq!(line.text, "Seker");
    assert_eq!(line.font, StandardFont::HelveticaBold);
    // Five glyphs at 3.5 each, right-aligned inside a 100-wide box with 2.5 margin.
    assert_eq!(line.x, 100.0 - 2.5 - 17.5);
}

#[tokio::test]
async fn wrapped_text_emits_one_run_per_line() {
    let w = writer();
    let mut regions = RegionStore::new();
    regions.push(text(TextKind::Add, Rect::new(0.0, 0.0, 50.0, 200.0), "one two three", TextStyle::default()));
    run(&w, &regions, &RegionStore::new()).await;
    let runs: Vec<String> = w
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            WriterOp::Text { run: line, .. } => Some(line.text),
            _ => None,
        })
        .collect();
    // Box is 25 wide with 2.5 margins: 20 units, 3.5 per glyph.
    assert_eq!(runs, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn pixelated_text_is_embedded_as_image() {
    let w = writer();
    let mut regions = RegionStore::new();
    let style = TextStyle { pixelate: PixelateLevel::Medium, ..TextStyle::default() };
    regions.push(text(TextKind::Add, Rect::new(0.0, 0.0, 100.0, 40.0), "Secret", style));
    run(&w, &regions, &RegionStore::new()).await;
    assert_eq!(
        w.ops(),
        vec![WriterOp::Image { page: 1, width: 100, height: 40, rect: Rect::new(0.0, 380.0, 50.0, 20.0) }]
    );
}

#[tokio::test]
async fn images_follow_regions_and_are_cropped() {
    let w = writer();
    let mut regions = RegionStore::new();
    regions.push(Region::Remove(RemoveRegion { page: 1, rect: Rect::new(0.0, 0.0, 10.0, 10.0), background: Rgb::WHITE }));
    let mut images = RegionStore::new();
    let mut image = ImageRegion::new(1, Rect::new(200.0, 200.0, 100.0, 50.0), Arc::new(RgbaImage::new(400, 200)));
    image.crop = CropWindow { left: 50.0, top: 20.0, right: 50.0, bottom: 30.0 };
    images.push(image);
    run(&w, &regions, &images).await;

    let ops = w.ops();
    assert!(matches!(ops[0], WriterOp::Rectangle { .. }));
    assert_eq!(ops[1], WriterOp::Image { page: 1, width: 300, height: 150, rect: Rect::new(100.0, 275.0, 50.0, 25.0) });
}

#[tokio::test]
async fn failing_item_is_skipped() {
    let mut w = writer();
    w.failing_pages = vec![1];
    let mut regions = RegionStore::new();
    regions.push(Region::Remove(RemoveRegion { page: 1, rect: Rect::new(0.0, 0.0, 10.0, 10.0), background: Rgb::WHITE }));
    regions.push(Region::Remove(RemoveRegion { page: 2, rect: Rect::new(0.0, 0.0, 10.0, 10.0), background: Rgb::WHITE }));
    regions.push(Region::Remove(RemoveRegion { page: 9, rect: Rect::new(0.0, 0.0, 10.0, 10.0), background: Rgb::WHITE }));
    run(&w, &regions, &RegionStore::new()).await;
    let ops = w.ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], WriterOp::Rectangle { page: 2, .. }));
}

#[tokio::test]
async fn open_failure_aborts() {
    let info = info();
    let regions = RegionStore::new();
    let images = RegionStore::new();
    let job = ExportJob { source: b"", info: &info, regions: &regions, images: &images };
    let err = export(&writer(), &FakeFactory::default(), &job).await.unwrap_err();
    assert_eq!(err.error_code(), "E_WRITER_OPEN");
}

#[test]
fn cropped_source_rejects_empty_window() {
    let mut image = ImageRegion::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), Arc::new(RgbaImage::new(10, 10)));
    assert_eq!(cropped_source(&image).map(|i| i.dimensions()), Some((10, 10)));
    image.crop = CropWindow { left: 5.0, top: 0.0, right: 5.0, bottom: 0.0 };
    assert!(cropped_source(&image).is_none());
}
