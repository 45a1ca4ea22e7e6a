//! Manifest writer

use std::path::{Path, PathBuf};

use tracing::debug;

use sori_core::manifest::{MANIFEST_FILENAME, Manifest};

use crate::error::{Result, SoriError};
use crate::partial_path;

/// Write `manifest` to `<subject_dir>/manifest.json`, replacing any old one.
///
/// The document is written beside the target and renamed over it, so readers
/// only ever see a complete manifest.
pub async fn write_manifest(subject_dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    tokio::fs::create_dir_all(subject_dir)
        .await
        .map_err(SoriError::io("failed to create", subject_dir))?;

    let dest = subject_dir.join(MANIFEST_FILENAME);
    let partial = partial_path(&dest);

    tokio::fs::write(&partial, manifest.to_json())
        .await
        .map_err(SoriError::io("failed to write", &partial))?;
    tokio::fs::rename(&partial, &dest)
        .await
        .map_err(SoriError::io("failed to finalize", &dest))?;

    debug!("wrote {} ({} entries)", dest.display(), manifest.len());
    Ok(dest)
}

/// Load a previously written manifest.
pub async fn read_manifest(subject_dir: &Path) -> Result<Manifest> {
    let path = subject_dir.join(MANIFEST_FILENAME);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(SoriError::io("failed to read", &path))?;
    Manifest::from_json(&contents).map_err(|source| SoriError::Parse { path, source })
}
