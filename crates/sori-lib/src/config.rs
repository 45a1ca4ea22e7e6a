//! Generator configuration, loaded from `sori.json`.
//!
//! Every section is optional; missing fields fall back to the defaults below,
//! which reproduce the stock lesson-site layout (`data/` in, `audio/tts/` out).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use sori_core::rate::rate_to_speed;
use sori_core::types::{DEFAULT_CONCURRENCY, SynthConfig};

use crate::error::{Result, SoriError};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sori.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<subject>.json` records.
    pub data_dir: PathBuf,
    /// Root of the per-subject audio directories.
    pub output_dir: PathBuf,
    pub subjects: Vec<String>,
    pub concurrency: usize,
    /// Continue with the next subject after a failed batch.
    pub keep_going: bool,
    pub synth: SynthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "data".into(),
            output_dir: PathBuf::from("audio").join("tts"),
            subjects: vec!["asa".into(), "leah".into(), "inessa".into()],
            concurrency: DEFAULT_CONCURRENCY,
            keep_going: false,
            synth: SynthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `./sori.json` is used if
    /// present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        let Some(config_path) = resolved else {
            info!("no config file found, using defaults");
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(&config_path)
            .map_err(SoriError::io("failed to read config", &config_path))?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| SoriError::Parse {
            path: config_path.clone(),
            source,
        })?;
        info!("loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(SoriError::Config("concurrency must be at least 1".into()));
        }
        if self.synth.voice.trim().is_empty() {
            return Err(SoriError::Config("voice must not be empty".into()));
        }
        if let Some(rate) = &self.synth.rate {
            rate_to_speed(rate)?;
        }
        Ok(())
    }

    /// Path of a subject's input record.
    pub fn record_path(&self, subject: &str) -> PathBuf {
        self.data_dir.join(format!("{subject}.json"))
    }

    /// Directory a subject's audio and manifest are written to.
    pub fn subject_dir(&self, subject: &str) -> PathBuf {
        self.output_dir.join(subject)
    }
}
