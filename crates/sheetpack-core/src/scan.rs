//! Builds an [`AssetTree`] from a directory on disk.
//!
//! Entries are visited in file-name order, so the same directory yields the
//! same tree (and the same index) on every platform. Files that fail to decode
//! and entries that are neither files nor directories do not abort the scan;
//! they are returned as [`ScanDiagnostic`]s next to the tree.

use crate::error::{Result, SheetPackError};
use crate::tree::{AssetNode, AssetTree, Group, Leaf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// File extensions treated as images (case insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "gif"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanOptions {
    /// If non-empty, only files matching one of these globs are considered.
    #[serde(default)]
    pub include: Vec<String>,
    /// Files matching any of these globs are ignored. A directory whose own
    /// relative path matches (`sub`, `**/tmp`) is pruned with everything
    /// below it. Patterns such as `sub/**` only match the files, so `sub`
    /// remains in the tree as an empty group.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Follow symbolic links. When off, links are skipped as structural entries.
    #[serde(default)]
    pub follow_links: bool,
}

/// Why an entry was left out of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("not a recognised image file")]
    UnsupportedFormat,
    #[error("neither a file nor a directory")]
    NotFileOrDirectory,
    #[error("unreadable entry: {0}")]
    Unreadable(String),
    /// The file name is not valid UTF-8 and cannot form an index key.
    #[error("file name is not valid UTF-8")]
    InvalidName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDiagnostic {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Tree built from a directory plus everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub tree: AssetTree,
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// Returns true if `p` carries one of [`IMAGE_EXTENSIONS`].
pub fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str())
    )
}

/// Scans `root` recursively into an asset tree.
///
/// A missing or unreadable `root` is an error; problems below it become
/// diagnostics.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan_dir(root: &Path, opts: &ScanOptions) -> Result<ScanOutput> {
    if !fs::metadata(root)?.is_dir() {
        return Err(SheetPackError::InvalidInput(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    fs::read_dir(root)?;

    let include = build_globset(&opts.include)?;
    let exclude = build_globset(&opts.exclude)?;

    // stack[0] is the unnamed root; stack[d] is the open group at depth d
    let mut stack: Vec<Group> = vec![Group::default()];
    let mut diagnostics = Vec::new();

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(opts.follow_links)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(SheetPackError::Io(err.into()));
                }
                let path = err.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %err, "skip unreadable entry");
                diagnostics.push(ScanDiagnostic {
                    path,
                    reason: SkipReason::Unreadable(err.to_string()),
                });
                continue;
            }
        };

        close_groups(&mut stack, entry.depth());
        let path = entry.path();
        let file_type = entry.file_type();
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %path.display(), "skip entry with non UTF-8 name");
            diagnostics.push(ScanDiagnostic {
                path: path.to_path_buf(),
                reason: SkipReason::InvalidName,
            });
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        };
        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if file_type.is_dir() {
            if exclude.as_ref().is_some_and(|ex| ex.is_match(&rel)) {
                debug!(path = %rel, "pruned directory");
                walker.skip_current_dir();
                continue;
            }
            stack.push(Group::new(name, Vec::new()));
            continue;
        }
        if !file_type.is_file() {
            warn!(path = %path.display(), "skip entry that is neither file nor directory");
            diagnostics.push(ScanDiagnostic {
                path: path.to_path_buf(),
                reason: SkipReason::NotFileOrDirectory,
            });
            continue;
        }

        if should_skip(&rel, include.as_ref(), exclude.as_ref()) {
            debug!(path = %rel, "filtered out");
            continue;
        }
        if !is_image(path) {
            warn!(path = %rel, "skip non-image file");
            diagnostics.push(ScanDiagnostic {
                path: path.to_path_buf(),
                reason: SkipReason::UnsupportedFormat,
            });
            continue;
        }

        match decode_dimensions(path) {
            Ok((width, height)) => {
                if let Some(group) = stack.last_mut() {
                    group
                        .children
                        .push(Leaf::new(name, width, height).with_source(path).into());
                }
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "skip image");
                diagnostics.push(ScanDiagnostic {
                    path: path.to_path_buf(),
                    reason: SkipReason::Decode(e.to_string()),
                });
            }
        }
    }

    close_groups(&mut stack, 1);
    let root_group = stack.pop().unwrap_or_default();
    let tree = AssetTree::new(root_group.children);
    info!(
        leaves = tree.leaf_count(),
        skipped = diagnostics.len(),
        "scanned source tree"
    );
    Ok(ScanOutput { tree, diagnostics })
}

/// Folds every open group deeper than `depth - 1` into its parent, leaving
/// the parent of an entry at `depth` on top of the stack.
fn close_groups(stack: &mut Vec<Group>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(group) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(AssetNode::Group(group));
            }
        }
    }
}

fn decode_dimensions(p: &Path) -> Result<(u32, u32)> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok((img.width(), img.height()))
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(rel: &str, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(ex) = exclude {
        if ex.is_match(rel) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(rel) {
            return true;
        }
    }
    false
}
