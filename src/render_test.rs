use std::sync::Arc;

use super::*;
use crate::doc::{CropWindow, GuideRef, PixelateLevel, RemoveRegion, TextKind, TextStyle};
use crate::testkit::{DrawOp, FakeFactory, RecordingSurface};

struct Fixture {
    camera: Camera,
    regions: RegionStore<Region>,
    images: RegionStore<ImageRegion>,
    guides: GuideLines,
    ui: UiState,
    viewport: Size,
    pending: Option<(DrawKind, Rect)>,
}

impl Fixture {
    fn new(zoom: f64) -> Self {
        Self {
            camera: Camera::new(zoom),
            regions: RegionStore::new(),
            images: RegionStore::new(),
            guides: GuideLines::default(),
            ui: UiState::default(),
            viewport: Size::new(600.0, 800.0),
            pending: None,
        }
    }

    fn render(&self) -> (RecordingSurface, FakeFactory) {
        let mut surface = RecordingSurface::new(600, 800);
        let factory = FakeFactory::default();
        let scene = Scene {
            camera: &self.camera,
            page: 1,
            regions: &self.regions,
            images: &self.images,
            guides: &self.guides,
            ui: &self.ui,
            viewport: self.viewport,
            pending: self.pending,
        };
        draw(&mut surface, &factory, &scene);
        (surface, factory)
    }
}

fn text_region(kind: TextKind, rect: Rect, text: &str) -> Region {
    Region::Text(TextRegion {
        kind,
        page: 1,
        rect,
        text: text.into(),
        style: TextStyle::default(),
        background: Rgb::new(250, 250, 250),
    })
}

#[test]
fn replace_region_draws_background_then_outline_then_text() {
    let mut fx = Fixture::new(1.0);
    fx.regions.push(text_region(TextKind::Replace, Rect::new(10.0, 10.0, 200.0, 40.0), "Hello"));
    fx.ui.selected = Some(ItemRef::Region(0));
    let (surface, _) = fx.render();

    assert_eq!(surface.ops[0], DrawOp::Clear);
    assert_eq!(surface.ops[1], DrawOp::FillRect { rect: Rect::new(10.0, 10.0, 200.0, 40.0), color: Rgb::new(250, 250, 250) });
    assert_eq!(
        surface.ops[2],
        DrawOp::StrokeRect { rect: Rect::new(10.0, 10.0, 200.0, 40.0), color: SELECTION_COLOR, dashed: true }
    );
    assert!(matches!(&surface.ops[3], DrawOp::Text { text, x, .. } if text == "Hello" && (*x - 15.0).abs() < 1e-9));
}

#[test]
fn add_region_has_no_background() {
    let mut fx = Fixture::new(1.0);
    fx.regions.push(text_region(TextKind::Add, Rect::new(10.0, 10.0, 200.0, 40.0), "Hello"));
    let (surface, _) = fx.render();
    assert!(!surface.ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
    assert_eq!(surface.texts().len(), 1);
}

#[test]
fn geometry_and_font_scale_with_zoom() {
    let mut fx = Fixture::new(2.0);
    fx.regions.push(text_region(TextKind::Replace, Rect::new(10.0, 10.0, 100.0, 40.0), "Hi"));
    let (surface, _) = fx.render();
    assert_eq!(surface.ops[1], DrawOp::FillRect { rect: Rect::new(20.0, 20.0, 200.0, 80.0), color: Rgb::new(250, 250, 250) });
    assert!(matches!(surface.texts()[0], DrawOp::Text { size, .. } if (*size - 28.0).abs() < 1e-9));
}

#[test]
fn remove_region_draws_patch_only() {
    let mut fx = Fixture::new(1.0);
    fx.regions.push(Region::Remove(RemoveRegion { page: 1, rect: Rect::new(0.0, 0.0, 30.0, 30.0), background: Rgb::BLACK }));
    let (surface, _) = fx.render();
    assert_eq!(surface.ops.len(), 2);
    assert_eq!(*surface.pixels.get_pixel(15, 15), image::Rgba([0, 0, 0, 255]));
}

#[test]
fn other_pages_are_not_drawn() {
    let mut fx = Fixture::new(1.0);
    fx.regions.push(Region::Remove(RemoveRegion { page: 2, rect: Rect::new(0.0, 0.0, 30.0, 30.0), background: Rgb::BLACK }));
    let (surface, _) = fx.render();
    assert_eq!(surface.ops, vec![DrawOp::Clear]);
}

#[test]
fn images_draw_after_regions_with_crop_window() {
    let mut fx = Fixture::new(1.0);
    let mut image = ImageRegion::new(1, Rect::new(0.0, 0.0, 60.0, 40.0), Arc::new(image::RgbaImage::new(40, 20)));
    image.crop = CropWindow { left: 10.0, top: 0.0, right: 0.0, bottom: 5.0 };
    fx.images.push(image);
    fx.regions.push(text_region(TextKind::Replace, Rect::new(0.0, 0.0, 100.0, 100.0), ""));
    let (surface, _) = fx.render();

    let fill = surface.ops.iter().position(|op| matches!(op, DrawOp::FillRect { .. })).unwrap();
    let img = surface.ops.iter().position(|op| matches!(op, DrawOp::Image { .. })).unwrap();
    assert!(fill < img);
    assert_eq!(
        surface.ops[img],
        DrawOp::Image { src: Rect::new(10.0, 0.0, 30.0, 15.0), dst: Rect::new(0.0, 0.0, 60.0, 40.0), smoothing: true }
    );
    assert_eq!(
        surface.ops[img + 1],
        DrawOp::StrokeRect { rect: Rect::new(0.0, 0.0, 60.0, 40.0), color: IMAGE_OUTLINE_COLOR, dashed: false }
    );
}

#[test]
fn crop_target_uses_crop_outline() {
    let mut fx = Fixture::new(1.0);
    fx.images.push(ImageRegion::new(1, Rect::new(0.0, 0.0, 60.0, 40.0), Arc::new(image::RgbaImage::new(40, 20))));
    fx.ui.crop_target = Some(0);
    let (surface, _) = fx.render();
    assert!(surface.ops.contains(&DrawOp::StrokeRect {
        rect: Rect::new(0.0, 0.0, 60.0, 40.0),
        color: CROP_OUTLINE_COLOR,
        dashed: true
    }));
}

#[test]
fn guides_span_the_viewport() {
    let mut fx = Fixture::new(1.0);
    fx.guides.add(Orientation::Horizontal, 0.5);
    let v = fx.guides.add(Orientation::Vertical, 0.25);
    fx.ui.selected_guide = Some(v);
    let (surface, _) = fx.render();
    assert!(surface.ops.contains(&DrawOp::Line {
        from: Point::new(0.0, 400.0),
        to: Point::new(600.0, 400.0),
        color: GUIDE_COLOR
    }));
    assert!(surface.ops.contains(&DrawOp::Line {
        from: Point::new(150.0, 0.0),
        to: Point::new(150.0, 800.0),
        color: GUIDE_SELECTED_COLOR
    }));
    assert_eq!(fx.ui.selected_guide, Some(GuideRef { orientation: Orientation::Vertical, index: 0 }));
}

#[test]
fn guides_follow_page_viewport_not_surface() {
    let mut fx = Fixture::new(0.5);
    fx.viewport = Size::new(300.0, 400.0);
    fx.guides.add(Orientation::Horizontal, 0.5);
    let (surface, _) = fx.render();
    assert!(surface.ops.contains(&DrawOp::Line {
        from: Point::new(0.0, 200.0),
        to: Point::new(300.0, 200.0),
        color: GUIDE_COLOR
    }));
}

#[test]
fn selected_item_gets_eight_handles() {
    let mut fx = Fixture::new(1.0);
    fx.images.push(ImageRegion::new(1, Rect::new(100.0, 100.0, 60.0, 40.0), Arc::new(image::RgbaImage::new(40, 20))));
    fx.ui.selected = Some(ItemRef::Image(0));
    let (surface, _) = fx.render();
    let handles = surface
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::FillRect { color, .. } if *color == Rgb::WHITE))
        .count();
    assert_eq!(handles, 8);
    assert!(surface.ops.contains(&DrawOp::FillRect { rect: Rect::new(156.0, 136.0, 8.0, 8.0), color: Rgb::WHITE }));
}

#[test]
fn pending_preview_is_normalized_and_color_coded() {
    let mut fx = Fixture::new(2.0);
    fx.pending = Some((DrawKind::Remove, Rect::new(50.0, 50.0, -20.0, 10.0)));
    let (surface, _) = fx.render();
    assert_eq!(
        surface.ops.last(),
        Some(&DrawOp::StrokeRect { rect: Rect::new(60.0, 100.0, 40.0, 20.0), color: REMOVE_PREVIEW_COLOR, dashed: true })
    );
}

#[test]
fn pixelated_text_is_drawn_as_unsmoothed_raster() {
    let mut fx = Fixture::new(1.0);
    let mut region = text_region(TextKind::Add, Rect::new(0.0, 0.0, 100.0, 40.0), "Secret");
    if let Region::Text(t) = &mut region {
        t.style.pixelate = PixelateLevel::Medium;
    }
    fx.regions.push(region);
    let (surface, factory) = fx.render();
    assert_eq!(*factory.created.borrow(), vec![(50, 20)]);
    assert!(surface.texts().is_empty());
    assert!(surface.ops.contains(&DrawOp::Image {
        src: Rect::new(0.0, 0.0, 100.0, 40.0),
        dst: Rect::new(0.0, 0.0, 100.0, 40.0),
        smoothing: false
    }));
}
