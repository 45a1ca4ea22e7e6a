//! Subject record loader

use std::path::Path;

use tracing::{debug, warn};

use sori_core::record::SubjectRecord;

use crate::error::{Result, SoriError};

/// Read and parse a subject record.
///
/// A missing file is not an error: it yields `None` so the caller can skip the
/// subject. Unreadable or malformed files are.
pub async fn load_record(path: &Path) -> Result<Option<SubjectRecord>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("record not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(SoriError::io("failed to read", path)(e)),
    };

    let record = SubjectRecord::from_json(&contents).map_err(|source| SoriError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded {}", path.display());
    Ok(Some(record))
}
