//! Generator errors

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use sori_core::rate::RateError;

pub type Result<T, E = SoriError> = std::result::Result<T, E>;

/// Errors that can end a subject or a whole run.
#[derive(Debug, Error)]
pub enum SoriError {
    /// Filesystem failure on a known path
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Subject record or config file is not valid JSON
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    /// Could not reach the speech service
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Speech service answered with an error status
    #[error("speech service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("run cancelled")]
    Cancelled,

    /// One or more texts of a subject could not be synthesized
    #[error("{subject}: {failed} of {total} syntheses failed, manifest not written")]
    BatchFailed {
        subject: String,
        failed: usize,
        total: usize,
    },

    /// A blocking helper task panicked or was aborted
    #[error("background task failed: {0}")]
    Task(String),

    #[error("{0} subject(s) failed")]
    SubjectsFailed(usize),
}

impl SoriError {
    /// `map_err` adapter attaching the action and path to an I/O error.
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}
