//! sori-lib — Lesson audio generator engine.
//!
//! Record loading, synthesis dispatch, manifest writing, and run reporting.
//! Depends on sori-core for pure types and text processing.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod synth;

pub use error::{Result, SoriError};

// Re-export sori-core for convenience
pub use sori_core;

use std::path::{Path, PathBuf};

use tracing::warn;

/// Scratch name a file is written under before being renamed into place.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Remove a leftover `.partial` for `path`, if any.
pub(crate) async fn discard_partial(path: &Path) {
    let partial = partial_path(path);
    match tokio::fs::remove_file(&partial).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {e}", partial.display()),
    }
}
