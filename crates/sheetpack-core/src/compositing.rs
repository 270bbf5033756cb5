use crate::error::{Result, SheetPackError};
use crate::model::Layout;
use crate::tree::{AssetTree, KeyedLeaf};
use image::{ImageReader, Rgba, RgbaImage};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Supplies the pixels of a leaf at compositing time.
pub trait RasterSource {
    fn load(&self, leaf: &KeyedLeaf<'_>) -> Result<RgbaImage>;
}

/// Decodes each leaf from the file it was scanned from.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl RasterSource for FileSource {
    fn load(&self, leaf: &KeyedLeaf<'_>) -> Result<RgbaImage> {
        let path = leaf.leaf.source().ok_or_else(|| {
            SheetPackError::InvalidInput(format!("leaf `{}` has no source file", leaf.key))
        })?;
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(img.to_rgba8())
    }
}

/// In-memory rasters keyed by leaf key.
impl RasterSource for HashMap<String, RgbaImage> {
    fn load(&self, leaf: &KeyedLeaf<'_>) -> Result<RgbaImage> {
        self.get(&leaf.key)
            .cloned()
            .ok_or_else(|| SheetPackError::InvalidInput(format!("no raster for `{}`", leaf.key)))
    }
}

/// Allocates a transparent canvas of the layout size and blits every leaf at
/// its placement.
#[instrument(skip_all, fields(width = layout.width, height = layout.height))]
pub fn compose<S: RasterSource + ?Sized>(
    tree: &AssetTree,
    layout: &Layout,
    source: &S,
    outlines: bool,
) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    for leaf in tree.leaves() {
        let rect = layout
            .placement(&leaf.key)
            .ok_or_else(|| SheetPackError::MissingPlacement(leaf.key.clone()))?;
        let raster = source.load(&leaf)?;
        if raster.dimensions() != (leaf.leaf.width, leaf.leaf.height) {
            return Err(SheetPackError::InvalidInput(format!(
                "`{}` is {}x{} but was scanned as {}x{}",
                leaf.key,
                raster.width(),
                raster.height(),
                leaf.leaf.width,
                leaf.leaf.height
            )));
        }
        blit_rgba(&raster, &mut canvas, rect.x, rect.y, outlines);
        debug!(key = %leaf.key, x = rect.x, y = rect.y, "blitted");
    }
    Ok(canvas)
}

/// Copy `src` into `canvas` with its top-left at (dx, dy), clipping at the
/// canvas edge. With `outlines`, draw a red 1px border on the copied area.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, outlines: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();

    for yy in 0..sh {
        for xx in 0..sw {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
            }
        }
    }

    if outlines && sw > 0 && sh > 0 {
        let red = Rgba([255, 0, 0, 255]);
        for xx in 0..sw {
            for y in [dy, dy + sh - 1] {
                if dx + xx < cw && y < ch {
                    canvas.put_pixel(dx + xx, y, red);
                }
            }
        }
        for yy in 0..sh {
            for x in [dx, dx + sw - 1] {
                if x < cw && dy + yy < ch {
                    canvas.put_pixel(x, dy + yy, red);
                }
            }
        }
    }
}
