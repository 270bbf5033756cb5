//! All-or-nothing publishing of run outputs.
//!
//! Every output is first written to a temporary file next to its destination.
//! Destinations are only replaced once every output has been staged, so a
//! failed run never leaves a fresh atlas next to a stale (or missing) index.

use crate::error::{Result, SheetPackError};
use image::{ImageFormat, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// An output written to a temporary file, waiting to be renamed into place.
/// Dropping it deletes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    pub fn destination(&self) -> &Path {
        &self.dest
    }
}

fn temp_beside(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(tempfile::Builder::new().prefix(".sheetpack-").tempfile_in(dir)?)
}

/// Encodes `image` in the format implied by the extension of `dest`.
pub fn stage_image(image: &RgbaImage, dest: &Path) -> Result<StagedFile> {
    let format = ImageFormat::from_path(dest)?;
    let mut tmp = temp_beside(dest)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image.write_to(&mut writer, format)?;
        writer.flush()?;
    }
    Ok(StagedFile {
        tmp,
        dest: dest.to_path_buf(),
    })
}

pub fn stage_bytes(bytes: &[u8], dest: &Path) -> Result<StagedFile> {
    let mut tmp = temp_beside(dest)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    Ok(StagedFile {
        tmp,
        dest: dest.to_path_buf(),
    })
}

/// Renames every staged file onto its destination, in order.
///
/// Each rename is atomic on its own, but the set is not: if a later rename
/// fails, destinations renamed before it already hold the new contents while
/// the rest keep their old ones. Staging failures never reach this point, so
/// they leave every destination untouched.
pub fn publish(staged: Vec<StagedFile>) -> Result<()> {
    for file in staged {
        file.tmp.as_file().sync_all()?;
        let dest = file.dest;
        file.tmp
            .persist(&dest)
            .map_err(|e| SheetPackError::Io(e.error))?;
        info!(path = %dest.display(), "published");
    }
    Ok(())
}
