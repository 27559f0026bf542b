//! Writes generated units to disk
//!
//! Every unit is first written next to its destination as `<name>.tmp`.
//! Only when all of them are on disk are they renamed into place, so a
//! failed run leaves the existing units untouched.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::generate::GeneratedUnit;

/// Write every unit into `directory`, creating it if needed
pub async fn write_units(directory: &Path, units: &[GeneratedUnit]) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| Error::io(directory, e))?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(units.len());
    for unit in units {
        let path = directory.join(&unit.file_name);
        let tmp = directory.join(format!("{}.tmp", unit.file_name));

        if let Err(e) = stage(&tmp, &path, unit).await {
            discard(staged.iter().map(|(tmp, _)| tmp).chain([&tmp])).await;
            return Err(e);
        }
        staged.push((tmp, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = tokio::fs::rename(tmp, path).await {
            discard(staged[i..].iter().map(|(tmp, _)| tmp)).await;
            return Err(Error::io(path, e));
        }
        log::info!("Wrote {}", path.display());
        written.push(path.clone());
    }
    Ok(written)
}

async fn stage(tmp: &Path, path: &Path, unit: &GeneratedUnit) -> Result<()> {
    if let Ok(metadata) = tokio::fs::metadata(path).await {
        if metadata.is_dir() {
            return Err(Error::io(
                path,
                io::Error::other("destination is a directory"),
            ));
        }
    }
    tokio::fs::write(tmp, unit.text.as_bytes())
        .await
        .map_err(|e| Error::io(tmp, e))
}

async fn discard<'a>(tmps: impl Iterator<Item = &'a PathBuf>) {
    for tmp in tmps {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", tmp.display(), e);
            }
        }
    }
}
