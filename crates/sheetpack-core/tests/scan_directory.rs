use image::{Rgba, RgbaImage};
use sheetpack_core::error::SheetPackError;
use sheetpack_core::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path, w: u32, h: u32) {
    RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]))
        .save(path)
        .expect("write fixture");
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_png(&root.join("b.png"), 4, 6);
    write_png(&root.join("a.png"), 2, 3);
    fs::write(root.join("broken.png"), b"definitely not a png").expect("write");
    fs::write(root.join("notes.txt"), b"hello").expect("write");
    fs::create_dir(root.join("empty")).expect("mkdir");
    fs::create_dir(root.join("sub")).expect("mkdir");
    write_png(&root.join("sub").join("c.png"), 5, 5);
    dir
}

/// (name, width, height) for leaves, (name, children) for groups
#[derive(Debug, PartialEq)]
enum Shape {
    L(String, u32, u32),
    G(String, Vec<Shape>),
}

fn shape(nodes: &[AssetNode]) -> Vec<Shape> {
    nodes
        .iter()
        .map(|n| match n {
            AssetNode::Leaf(l) => Shape::L(l.name.clone(), l.width, l.height),
            AssetNode::Group(g) => Shape::G(g.name.clone().unwrap_or_default(), shape(&g.children)),
        })
        .collect()
}

fn l(name: &str, w: u32, h: u32) -> Shape {
    Shape::L(name.into(), w, h)
}

#[test]
fn scan_builds_sorted_tree_and_reports_skips() {
    let dir = fixture();
    let out = scan_dir(dir.path(), &ScanOptions::default()).expect("scan");

    assert_eq!(
        shape(out.tree.children()),
        vec![
            l("a.png", 2, 3),
            l("b.png", 4, 6),
            Shape::G("empty".into(), vec![]),
            Shape::G("sub".into(), vec![l("c.png", 5, 5)]),
        ]
    );
    assert_eq!(out.tree.leaf_count(), 3);

    assert_eq!(out.diagnostics.len(), 2);
    assert_eq!(out.diagnostics[0].path, dir.path().join("broken.png"));
    assert!(matches!(out.diagnostics[0].reason, SkipReason::Decode(_)));
    assert_eq!(out.diagnostics[1].path, dir.path().join("notes.txt"));
    assert_eq!(out.diagnostics[1].reason, SkipReason::UnsupportedFormat);
}

#[test]
fn leaves_remember_their_source_file() {
    let dir = fixture();
    let out = scan_dir(dir.path(), &ScanOptions::default()).expect("scan");
    let leaves = out.tree.leaves();
    let c = leaves.iter().find(|l| l.key == "sub/c.png").expect("c.png");
    assert_eq!(c.leaf.source(), Some(dir.path().join("sub").join("c.png").as_path()));
}

#[test]
fn exclude_globs_drop_files_silently() {
    let dir = fixture();
    let opts = ScanOptions {
        exclude: vec!["sub/**".into(), "*.txt".into()],
        ..Default::default()
    };
    let out = scan_dir(dir.path(), &opts).expect("scan");
    let keys: Vec<String> = out.tree.leaves().into_iter().map(|l| l.key).collect();
    assert_eq!(keys, vec!["a.png", "b.png"]);
    // only the undecodable file is reported
    assert_eq!(out.diagnostics.len(), 1);
}

#[test]
fn include_globs_restrict_candidates() {
    let dir = fixture();
    let opts = ScanOptions {
        include: vec!["a.png".into(), "sub/*.png".into()],
        ..Default::default()
    };
    let out = scan_dir(dir.path(), &opts).expect("scan");
    let keys: Vec<String> = out.tree.leaves().into_iter().map(|l| l.key).collect();
    assert_eq!(keys, vec!["a.png", "sub/c.png"]);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn invalid_glob_is_an_error() {
    let dir = fixture();
    let opts = ScanOptions {
        include: vec!["a[".into()],
        ..Default::default()
    };
    assert!(matches!(
        scan_dir(dir.path(), &opts),
        Err(SheetPackError::Glob(_))
    ));
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    assert!(matches!(
        scan_dir(&missing, &ScanOptions::default()),
        Err(SheetPackError::Io(_))
    ));
}

#[test]
fn file_root_is_rejected() {
    let dir = fixture();
    assert!(matches!(
        scan_dir(&dir.path().join("a.png"), &ScanOptions::default()),
        Err(SheetPackError::InvalidInput(_))
    ));
}

#[test]
fn empty_directory_scans_to_empty_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = scan_dir(dir.path(), &ScanOptions::default()).expect("scan");
    assert!(out.tree.is_empty());
    assert!(out.diagnostics.is_empty());
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped_unless_followed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = tempfile::tempdir().expect("tempdir");
    write_png(&target.path().join("real.png"), 3, 3);
    std::os::unix::fs::symlink(target.path().join("real.png"), dir.path().join("link.png"))
        .expect("symlink");

    let out = scan_dir(dir.path(), &ScanOptions::default()).expect("scan");
    assert!(out.tree.is_empty());
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].reason, SkipReason::NotFileOrDirectory);

    let opts = ScanOptions {
        follow_links: true,
        ..Default::default()
    };
    let out = scan_dir(dir.path(), &opts).expect("scan");
    assert_eq!(shape(out.tree.children()), vec![l("link.png", 3, 3)]);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn excluded_directories_are_pruned() {
    let dir = fixture();
    let opts = ScanOptions {
        exclude: vec!["sub".into(), "empty".into()],
        ..Default::default()
    };
    let out = scan_dir(dir.path(), &opts).expect("scan");
    assert_eq!(
        shape(out.tree.children()),
        vec![l("a.png", 2, 3), l("b.png", 4, 6)]
    );
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_skipped_not_fatal() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir.path().join(OsStr::from_bytes(b"a\xff.png")), 2, 2);
    write_png(&dir.path().join(OsStr::from_bytes(b"a\xfe.png")), 2, 2);
    let bad_dir = dir.path().join(OsStr::from_bytes(b"d\xff"));
    fs::create_dir(&bad_dir).expect("mkdir");
    write_png(&bad_dir.join("inner.png"), 2, 2);
    write_png(&dir.path().join("ok.png"), 3, 3);

    let out = scan_dir(dir.path(), &ScanOptions::default()).expect("scan");
    assert_eq!(shape(out.tree.children()), vec![l("ok.png", 3, 3)]);
    assert_eq!(out.diagnostics.len(), 3);
    assert!(
        out.diagnostics
            .iter()
            .all(|d| d.reason == SkipReason::InvalidName)
    );

    let layout = pack_tree(&out.tree, &PackerConfig::default()).expect("pack");
    assert_eq!(layout.frames.len(), 1);
}
