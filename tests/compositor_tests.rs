use image::{Rgba, RgbaImage};
use overtype::geometry::Rect;
use overtype::page::{Page, Region};
use overtype::render::layout::horizontal_anchor;
use overtype::render::{encode_png, Compositor, RenderError};
use overtype::utils::color::Color;

const BASE: Rgba<u8> = Rgba([200, 200, 200, 255]);

fn page_with_base() -> (Page, RgbaImage) {
    let page = Page::new(1, 300.0, 200.0, 1.0);
    let base = RgbaImage::from_pixel(300, 200, BASE);
    (page, base)
}

fn committed_cover(rect: Rect, fill: Color) -> Region {
    let mut region = Region::new(1, rect, "");
    region.bg_color = Some(fill);
    region.mask = Some(rect.into());
    region.is_cover_only = true;
    region.is_edited = true;
    region
}

#[test]
fn test_uncommitted_region_paints_nothing() {
    let (mut page, base) = page_with_base();
    let mut region = Region::new(1, Rect::new(10.0, 10.0, 50.0, 20.0), "text");
    region.bg_color = Some(Color::BLACK);
    // Never committed: is_edited stays false.
    page.regions.add(region);

    let out = Compositor::new().compose_export(&base, &page).unwrap();
    assert_eq!(*out.get_pixel(20, 15), BASE);
}

#[test]
fn test_mask_layer_fills_mask_geometry() {
    let (mut page, base) = page_with_base();
    page.regions.add(committed_cover(
        Rect::new(10.0, 10.0, 100.0, 20.0),
        Color::BLACK,
    ));

    let out = Compositor::new().compose_export(&base, &page).unwrap();

    assert_eq!(*out.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
    assert_eq!(*out.get_pixel(109, 29), Rgba([0, 0, 0, 255]));
    // One pixel past the mask on each axis is untouched.
    assert_eq!(*out.get_pixel(110, 10), BASE);
    assert_eq!(*out.get_pixel(10, 30), BASE);
}

#[test]
fn test_mask_stays_put_when_glyphs_nudge() {
    let (mut page, base) = page_with_base();

    let mut region = Region::new(1, Rect::new(10.0, 10.0, 100.0, 20.0), "label");
    region.bg_color = Some(Color::BLACK);
    region.is_edited = true;
    region.ensure_mask();
    // Nudge glyph geometry; the pinned mask must not follow.
    region.rect = region.rect.translated(5.0, 0.0);
    let glyph_rect = region.rect;
    // Keep the compositor font-free by not drawing glyphs in this test.
    region.text.clear();
    region.original_text.clear();
    page.regions.add(region);

    let out = Compositor::new().compose_export(&base, &page).unwrap();

    // Mask still covers the original rectangle, including the strip the
    // glyph box vacated ...
    assert_eq!(*out.get_pixel(10, 15), Rgba([0, 0, 0, 255]));
    assert_eq!(*out.get_pixel(109, 15), Rgba([0, 0, 0, 255]));
    // ... and has not expanded to the glyph box's new right edge.
    assert_eq!(*out.get_pixel(114, 15), BASE);

    // The glyph layer would anchor at the nudged position.
    let (x, _) = horizontal_anchor(&glyph_rect, 16.0, 1.0);
    assert_eq!(x, 19.0);
    assert_eq!(glyph_rect, Rect::new(15.0, 10.0, 100.0, 20.0));
}

#[test]
fn test_legacy_mask_without_color_fills_white() {
    let (mut page, base) = page_with_base();

    let mut region = Region::new(1, Rect::new(50.0, 50.0, 40.0, 10.0), "");
    region.is_edited = true;
    region.ensure_mask();
    assert!(region.bg_color.is_none());
    page.regions.add(region);

    let out = Compositor::new().compose_export(&base, &page).unwrap();
    assert_eq!(*out.get_pixel(60, 55), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_region_without_color_or_mask_draws_nothing() {
    let (mut page, base) = page_with_base();

    // Free-floating committed region with no fill: no mask layer at all.
    let mut region = Region::free_floating(1, false);
    region.is_edited = true;
    region.ensure_mask();
    page.regions.add(region);

    let out = Compositor::new().compose_export(&base, &page).unwrap();
    assert_eq!(*out.get_pixel(150, 120), BASE);
}

#[test]
fn test_preview_at_full_display_scale_matches_export() {
    let (mut page, base) = page_with_base();
    page.display_scale = 1.0;
    page.regions.add(committed_cover(
        Rect::new(30.0, 40.0, 60.0, 25.0),
        Color::new(10, 20, 30),
    ));

    let compositor = Compositor::new();
    let preview = compositor.compose_preview(&base, &page).unwrap();
    let export = compositor.compose_export(&base, &page).unwrap();

    assert_eq!(preview.dimensions(), export.dimensions());
    assert!(preview
        .pixels()
        .zip(export.pixels())
        .all(|(a, b)| a == b));
}

#[test]
fn test_preview_scales_mask_with_display_scale() {
    let (mut page, base) = page_with_base();
    page.display_scale = 0.5;
    page.regions.add(committed_cover(
        Rect::new(100.0, 100.0, 80.0, 40.0),
        Color::BLACK,
    ));

    let preview = Compositor::new().compose_preview(&base, &page).unwrap();

    assert_eq!(preview.dimensions(), (150, 100));
    // Mask lands at half its native coordinates.
    assert_eq!(*preview.get_pixel(51, 51), Rgba([0, 0, 0, 255]));
    assert_ne!(*preview.get_pixel(40, 40), Rgba([0, 0, 0, 255]));
}

#[test]
fn test_export_encodes_composited_page_as_png() {
    let (mut page, base) = page_with_base();
    page.regions.add(committed_cover(
        Rect::new(10.0, 10.0, 100.0, 20.0),
        Color::BLACK,
    ));

    let exported = Compositor::new().compose_export(&base, &page).unwrap();
    let bytes = encode_png(&exported).unwrap();

    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(*decoded.get_pixel(15, 15), Rgba([0, 0, 0, 255]));
}

#[test]
fn test_glyphs_without_font_fail_loudly() {
    let (mut page, base) = page_with_base();

    let mut region = Region::new(1, Rect::new(10.0, 10.0, 100.0, 20.0), "needs a font");
    region.is_edited = true;
    region.ensure_mask();
    page.regions.add(region);

    let result = Compositor::new().compose_export(&base, &page);
    assert!(matches!(result, Err(RenderError::FontUnavailable)));
}
