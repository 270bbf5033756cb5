//! Core library for packing a directory tree of images into one atlas.
//!
//! - Placement: [`FrontierPacker`], a greedy packer that tries every frontier
//!   point and keeps the one with the smallest resulting bounding box
//! - Model: [`AssetTree`] mirrors the source directories; [`Layout`] maps each
//!   leaf path to its rectangle in the atlas
//! - Pipeline: [`scan_dir`] → [`pack_tree`] → [`compose`] → [`render_index`],
//!   or [`pack_directory`] for the first three in one call
//! - Outputs are staged to temporary files and published together (see [`output`])
//!
//! Quick example:
//! ```ignore
//! use sheetpack_core::prelude::*;
//! # fn main() -> sheetpack_core::Result<()> {
//! let cfg = PackerConfig::default();
//! let out = pack_directory("assets".as_ref(), &ScanOptions::default(), &cfg)?;
//! let index = render_index(&out.tree, &out.layout, &cfg)?;
//! println!("{} ({} skipped)", out.stats().summary(), out.diagnostics.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod output;
pub mod packer;
pub mod pipeline;
pub mod scan;
pub mod tree;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use scan::*;
pub use tree::*;

/// Convenience prelude for common types and functions.
/// Importing `sheetpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::compositing::{FileSource, RasterSource, compose};
    pub use crate::config::{IndexFormat, PackerConfig, PackerConfigBuilder, SortOrder};
    pub use crate::export::{IndexEvent, IndexSink, LeafRecord, emit_index, index_events, render_index};
    pub use crate::packer::FrontierPacker;
    pub use crate::model::{Frame, Layout, PackStats, Rect};
    pub use crate::scan::{ScanDiagnostic, ScanOptions, ScanOutput, SkipReason, scan_dir};
    pub use crate::tree::{AssetNode, AssetTree, Group, KeyedLeaf, Leaf};
    pub use crate::{PackOutput, pack_directory, pack_tree};
}
