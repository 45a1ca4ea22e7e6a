//! Run reporter — scans produced audio for the end-of-run summary.
//!
//! Symlinks are never followed, so a link inside the output tree can neither
//! loop the walk nor count the same file twice.

use std::path::{Path, PathBuf};
use std::time::Duration;

use walkdir::WalkDir;

use sori_core::filename::AUDIO_EXTENSION;
use sori_core::types::{FileStats, RunReport};

use crate::error::{Result, SoriError};

fn is_audio(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == AUDIO_EXTENSION)
}

fn walk_error(root: &Path, e: walkdir::Error) -> SoriError {
    let path = e.path().unwrap_or(root).to_path_buf();
    SoriError::io("failed to scan", path)(e.into())
}

/// Sum the audio files below `root`, down to `max_depth` levels.
/// A missing root counts as empty.
fn scan(root: &Path, max_depth: usize) -> Result<FileStats> {
    let mut stats = FileStats::default();
    if !root.is_dir() {
        return Ok(stats);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth);
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() || !is_audio(entry.path()) {
            continue;
        }
        let meta = entry.metadata().map_err(|e| walk_error(root, e))?;
        stats.add(meta.len());
    }
    Ok(stats)
}

/// Audio files directly inside `dir`.
pub fn scan_dir(dir: &Path) -> Result<FileStats> {
    scan(dir, 1)
}

/// Audio files anywhere below `root`.
pub fn scan_tree(root: &Path) -> Result<FileStats> {
    scan(root, usize::MAX)
}

/// Build the summary for `subjects` under `output_dir`.
///
/// Subjects without an output directory are left out of the breakdown.
/// Blocks on filesystem calls; async callers go through [`collect_report`].
pub fn build_report(
    output_dir: &Path,
    subjects: &[String],
    elapsed: Duration,
) -> Result<RunReport> {
    let total = scan_tree(output_dir)?;
    let mut breakdown = Vec::new();
    for subject in subjects {
        let dir = output_dir.join(subject);
        if dir.is_dir() {
            breakdown.push((subject.clone(), scan_dir(&dir)?));
        }
    }

    Ok(RunReport {
        total,
        elapsed,
        subjects: breakdown,
    })
}

/// [`build_report`] on the blocking pool.
pub async fn collect_report(
    output_dir: PathBuf,
    subjects: Vec<String>,
    elapsed: Duration,
) -> Result<RunReport> {
    tokio::task::spawn_blocking(move || build_report(&output_dir, &subjects, elapsed))
        .await
        .map_err(|e| SoriError::Task(format!("report scan: {e}")))?
}
