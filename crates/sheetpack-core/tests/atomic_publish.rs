use image::{Rgba, RgbaImage};
use sheetpack_core::output::{publish, stage_bytes, stage_image};
use std::fs;
use std::path::Path;

fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(".sheetpack-"))
        .collect()
}

#[test]
fn outputs_appear_only_after_publish() {
    let dir = tempfile::tempdir().expect("tempdir");
    let atlas = dir.path().join("atlas.png");
    let index = dir.path().join("atlas.json");

    let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
    let staged = vec![
        stage_image(&img, &atlas).expect("stage atlas"),
        stage_bytes(b"{}", &index).expect("stage index"),
    ];
    assert_eq!(staged[0].destination(), atlas.as_path());
    assert!(!atlas.exists());
    assert!(!index.exists());

    publish(staged).expect("publish");
    assert_eq!(fs::read(&index).expect("index"), b"{}");
    let decoded = image::open(&atlas).expect("atlas").to_rgba8();
    assert_eq!(decoded, img);
    assert!(leftovers(dir.path()).is_empty());
}

#[test]
fn existing_outputs_are_replaced() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = dir.path().join("index.txt");
    fs::write(&index, b"stale").expect("write");

    let staged = stage_bytes(b"fresh", &index).expect("stage");
    assert_eq!(fs::read(&index).expect("read"), b"stale");
    publish(vec![staged]).expect("publish");
    assert_eq!(fs::read(&index).expect("read"), b"fresh");
}

#[test]
fn failed_staging_leaves_nothing_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = dir.path().join("atlas.json");
    let atlas = dir.path().join("atlas.unknown-ext");

    let staged_index = stage_bytes(b"{}", &index).expect("stage index");
    let img = RgbaImage::new(2, 2);
    assert!(stage_image(&img, &atlas).is_err());
    drop(staged_index);

    assert!(!index.exists());
    assert!(!atlas.exists());
    assert!(leftovers(dir.path()).is_empty());
}
