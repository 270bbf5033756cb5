use crate::compositing::{FileSource, compose};
use crate::config::{PackerConfig, SortOrder};
use crate::error::{Result, SheetPackError};
use crate::packer::FrontierPacker;
use crate::model::{Frame, Layout, Rect};
use crate::scan::{ScanDiagnostic, ScanOptions, scan_dir};
use crate::tree::{AssetTree, KeyedLeaf};
use image::RgbaImage;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Output of a full run: the scanned tree, what was skipped, where every leaf
/// went, and the composited atlas.
pub struct PackOutput {
    pub tree: AssetTree,
    pub diagnostics: Vec<ScanDiagnostic>,
    pub layout: Layout,
    pub atlas: RgbaImage,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    pub fn stats(&self) -> crate::model::PackStats {
        self.layout.stats()
    }
}

/// Scans `root`, packs every image found and composites the atlas.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn pack_directory(root: &Path, scan: &ScanOptions, cfg: &PackerConfig) -> Result<PackOutput> {
    let scanned = scan_dir(root, scan)?;
    let layout = pack_tree(&scanned.tree, cfg)?;
    let atlas = compose(&scanned.tree, &layout, &FileSource, cfg.outlines)?;
    Ok(PackOutput {
        tree: scanned.tree,
        diagnostics: scanned.diagnostics,
        layout,
        atlas,
    })
}

/// Places every leaf of `tree` and returns the resulting layout.
///
/// Leaves are flattened in pre-order, stably sorted per `cfg.sort_order`
/// (tallest first by default) and fed one by one to a [`FrontierPacker`].
/// Any leaf that cannot be placed aborts the whole pack.
#[instrument(skip_all)]
pub fn pack_tree(tree: &AssetTree, cfg: &PackerConfig) -> Result<Layout> {
    cfg.validate()?;

    let mut leaves = tree.leaves();
    if leaves.is_empty() {
        return Err(SheetPackError::Empty);
    }
    let mut seen = HashSet::with_capacity(leaves.len());
    for leaf in &leaves {
        if !seen.insert(leaf.key.as_str()) {
            return Err(SheetPackError::InvalidInput(format!(
                "duplicate leaf key `{}`",
                leaf.key
            )));
        }
    }
    sort_leaves(&mut leaves, cfg.sort_order);

    let pad = cfg.padding;
    let mut packer = FrontierPacker::with_limits(cfg.max_width, cfg.max_height);
    let mut frames = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        let (w, h) = (leaf.leaf.width, leaf.leaf.height);
        let slot = (w > 0 && h > 0)
            .then(|| w.checked_add(pad).zip(h.checked_add(pad)))
            .flatten();
        let Some((slot_w, slot_h)) = slot else {
            return Err(SheetPackError::NoViablePosition {
                width: w,
                height: h,
                placed: frames.len(),
            });
        };
        let (x, y) = packer.place(slot_w, slot_h)?;
        debug!(key = %leaf.key, x, y, w, h, "placed leaf");
        frames.push(Frame {
            key: leaf.key.clone(),
            frame: Rect::new(x, y, w, h),
        });
    }

    let (bw, bh) = packer.bounding_size();
    let content = (bw.saturating_sub(pad), bh.saturating_sub(pad));
    let (width, height) = compute_canvas_size(content, cfg);
    info!(frames = frames.len(), width, height, "packed");
    Ok(Layout::new(width, height, content, frames))
}

/// Stable sort of flattened leaves. Ties keep traversal order.
pub fn sort_leaves(leaves: &mut [KeyedLeaf<'_>], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::HeightDesc => leaves.sort_by(|a, b| b.leaf.height.cmp(&a.leaf.height)),
        SortOrder::WidthDesc => leaves.sort_by(|a, b| b.leaf.width.cmp(&a.leaf.width)),
        SortOrder::AreaDesc => leaves.sort_by(|a, b| {
            let area = |l: &KeyedLeaf<'_>| (l.leaf.width as u64) * (l.leaf.height as u64);
            area(b).cmp(&area(a))
        }),
        SortOrder::MaxSideDesc => leaves.sort_by(|a, b| {
            b.leaf
                .width
                .max(b.leaf.height)
                .cmp(&a.leaf.width.max(a.leaf.height))
        }),
    }
}

/// Canvas size for a content bounding box: optional power-of-two rounding,
/// then optional squaring.
fn compute_canvas_size(content: (u32, u32), cfg: &PackerConfig) -> (u32, u32) {
    let (mut w, mut h) = content;
    if cfg.power_of_two {
        w = next_pow2(w.max(1));
        h = next_pow2(h.max(1));
    }
    if cfg.square {
        let m = w.max(h);
        w = m;
        h = m;
    }
    (w, h)
}

fn next_pow2(v: u32) -> u32 {
    v.checked_next_power_of_two().unwrap_or(v)
}
