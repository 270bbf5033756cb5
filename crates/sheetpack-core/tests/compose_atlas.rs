use image::{Rgba, RgbaImage};
use sheetpack_core::error::SheetPackError;
use sheetpack_core::prelude::*;
use std::collections::HashMap;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn tree() -> AssetTree {
    AssetTree::new(vec![
        Leaf::new("tall.png", 4, 8).into(),
        Group::new("g", vec![Leaf::new("wide.png", 6, 2).into()]).into(),
    ])
}

fn rasters() -> HashMap<String, RgbaImage> {
    let mut m = HashMap::new();
    m.insert("tall.png".to_string(), RgbaImage::from_pixel(4, 8, GREEN));
    m.insert("g/wide.png".to_string(), RgbaImage::from_pixel(6, 2, BLUE));
    m
}

#[test]
fn pixels_land_at_their_placements() {
    let tree = tree();
    let layout = pack_tree(&tree, &PackerConfig::default()).expect("pack");
    // below the tall image the box is 6x10, beside it 10x8
    assert_eq!(layout.placement("tall.png"), Some(Rect::new(0, 0, 4, 8)));
    assert_eq!(layout.placement("g/wide.png"), Some(Rect::new(0, 8, 6, 2)));

    let atlas = compose(&tree, &layout, &rasters(), false).expect("compose");
    assert_eq!(atlas.dimensions(), (6, 10));
    assert_eq!(*atlas.get_pixel(0, 0), GREEN);
    assert_eq!(*atlas.get_pixel(3, 7), GREEN);
    assert_eq!(*atlas.get_pixel(0, 8), BLUE);
    assert_eq!(*atlas.get_pixel(5, 9), BLUE);
    // uncovered pixels stay transparent
    assert_eq!(*atlas.get_pixel(4, 0), CLEAR);
    assert_eq!(*atlas.get_pixel(5, 7), CLEAR);
}

#[test]
fn canvas_uses_adjusted_layout_size() {
    let tree = tree();
    let cfg = PackerConfig::builder().pow2(true).build();
    let layout = pack_tree(&tree, &cfg).expect("pack");
    let atlas = compose(&tree, &layout, &rasters(), false).expect("compose");
    assert_eq!(atlas.dimensions(), (8, 16));
    assert_eq!(*atlas.get_pixel(7, 15), CLEAR);
}

#[test]
fn outlines_mark_image_borders() {
    let tree = tree();
    let layout = pack_tree(&tree, &PackerConfig::default()).expect("pack");
    let atlas = compose(&tree, &layout, &rasters(), true).expect("compose");
    assert_eq!(*atlas.get_pixel(0, 0), RED);
    assert_eq!(*atlas.get_pixel(3, 4), RED);
    assert_eq!(*atlas.get_pixel(1, 4), GREEN);
}

#[test]
fn raster_size_mismatch_is_rejected() {
    let tree = tree();
    let layout = pack_tree(&tree, &PackerConfig::default()).expect("pack");
    let mut src = rasters();
    src.insert("tall.png".to_string(), RgbaImage::from_pixel(5, 8, GREEN));
    assert!(matches!(
        compose(&tree, &layout, &src, false),
        Err(SheetPackError::InvalidInput(_))
    ));
}

#[test]
fn missing_raster_is_rejected() {
    let tree = tree();
    let layout = pack_tree(&tree, &PackerConfig::default()).expect("pack");
    let mut src = rasters();
    src.remove("g/wide.png");
    assert!(compose(&tree, &layout, &src, false).is_err());
}

#[test]
fn file_source_requires_a_path() {
    let tree = tree();
    let layout = pack_tree(&tree, &PackerConfig::default()).expect("pack");
    assert!(matches!(
        compose(&tree, &layout, &FileSource, false),
        Err(SheetPackError::InvalidInput(_))
    ));
}

#[test]
fn pack_directory_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("ui")).expect("mkdir");
    RgbaImage::from_pixel(8, 8, GREEN)
        .save(dir.path().join("ui").join("icon.png"))
        .expect("write");
    RgbaImage::from_pixel(4, 2, BLUE)
        .save(dir.path().join("bar.png"))
        .expect("write");
    std::fs::write(dir.path().join("README"), b"docs").expect("write");

    let out = pack_directory(dir.path(), &ScanOptions::default(), &PackerConfig::default())
        .expect("pack");
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.layout.placement("ui/icon.png"), Some(Rect::new(0, 0, 8, 8)));
    assert_eq!(out.layout.placement("bar.png"), Some(Rect::new(0, 8, 4, 2)));
    assert_eq!(out.atlas.dimensions(), (8, 10));
    assert_eq!(*out.atlas.get_pixel(7, 7), GREEN);
    assert_eq!(*out.atlas.get_pixel(3, 9), BLUE);
    assert_eq!(out.stats().num_frames, 2);
}
