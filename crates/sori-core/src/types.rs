//! Shared types for the sori generator.
//!
//! Kept in sori-core so consumers can depend on them without pulling in tokio
//! or reqwest.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─── Synthesis types ───────────────────────────────────────────────────────

/// Voice used for every generated file.
pub const DEFAULT_VOICE: &str = "ko-KR-SunHiNeural";

/// Maximum synthesis calls in flight per batch.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Speech service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Base URL of an OpenAI-compatible speech server.
    pub base_url: String,
    pub model: String,
    pub voice: String,
    /// Edge-style rate override such as `"-20%"`.
    pub rate: Option<String>,
    pub api_key: Option<String>,
    /// Per-invocation limit.
    pub timeout_secs: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8880".into(),
            model: "tts-1".into(),
            voice: DEFAULT_VOICE.into(),
            rate: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// One synthesis call: text, voice and optional rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthRequest {
    pub text: String,
    pub voice: String,
    pub rate: Option<String>,
}

// ─── Run types ─────────────────────────────────────────────────────────────

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    LoadingSubjects,
    ExtractingTexts,
    DerivingFilenames,
    SynthesizingBatch,
    WritingManifest,
    Reporting,
    Done,
}

/// Progress payload emitted after each finished synthesis.
#[derive(Debug, Clone)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub subject: String,
    pub filename: String,
    pub text: String,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}/{} -> \"{}\"",
            self.current, self.total, self.subject, self.filename, self.text
        )
    }
}

/// Milestones reported to the caller while a run progresses.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// No record for the subject; nothing was generated.
    SubjectSkipped { subject: String, path: String },
    /// Texts extracted; synthesis is about to start.
    SubjectPlanned { subject: String, texts: usize },
    Synthesized(Progress),
    ManifestWritten { subject: String, entries: usize },
    /// Batch had failures; no manifest was written.
    SubjectFailed {
        subject: String,
        failed: usize,
        total: usize,
    },
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubjectSkipped { subject, path } => {
                write!(f, "Skipping {subject}: {path} not found")
            }
            Self::SubjectPlanned { subject, texts } => {
                write!(f, "{subject}: {texts} unique texts found")
            }
            Self::Synthesized(progress) => write!(f, "{progress}"),
            Self::ManifestWritten { subject, entries } => {
                write!(f, "{subject}: manifest.json written ({entries} entries)")
            }
            Self::SubjectFailed {
                subject,
                failed,
                total,
            } => write!(
                f,
                "{subject}: {failed}/{total} syntheses failed, manifest not written"
            ),
        }
    }
}

// ─── Report types ──────────────────────────────────────────────────────────

/// Audio files found in one directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub files: usize,
    pub bytes: u64,
}

impl FileStats {
    pub fn add(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub total: FileStats,
    pub elapsed: Duration,
    /// Subjects whose output directory exists, in configured order.
    pub subjects: Vec<(String, FileStats)>,
}

pub fn kib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

pub fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "DONE!")?;
        writeln!(f, "Total MP3 files: {}", self.total.files)?;
        writeln!(
            f,
            "Total size: {:.1} KB ({:.2} MB)",
            kib(self.total.bytes),
            mib(self.total.bytes)
        )?;
        write!(f, "Time: {:.1}s", self.elapsed.as_secs_f64())?;
        for (subject, stats) in &self.subjects {
            write!(
                f,
                "\n  {subject}: {} files, {:.1} KB",
                stats.files,
                kib(stats.bytes)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line() {
        let p = Progress {
            current: 3,
            total: 40,
            subject: "asa".into(),
            filename: "0002_abcdef.mp3".into(),
            text: "하나".into(),
        };
        assert_eq!(p.to_string(), "[3/40] asa/0002_abcdef.mp3 -> \"하나\"");
    }

    #[test]
    fn event_lines() {
        let skipped = RunEvent::SubjectSkipped {
            subject: "leah".into(),
            path: "data/leah.json".into(),
        };
        assert_eq!(skipped.to_string(), "Skipping leah: data/leah.json not found");

        let written = RunEvent::ManifestWritten {
            subject: "asa".into(),
            entries: 12,
        };
        assert_eq!(written.to_string(), "asa: manifest.json written (12 entries)");
    }

    #[test]
    fn report_block() {
        let report = RunReport {
            total: FileStats {
                files: 2,
                bytes: 3 * 1024 * 1024,
            },
            elapsed: Duration::from_millis(12_340),
            subjects: vec![(
                "asa".into(),
                FileStats {
                    files: 2,
                    bytes: 2048,
                },
            )],
        };
        let text = report.to_string();
        assert!(text.contains("Total MP3 files: 2"));
        assert!(text.contains("Total size: 3072.0 KB (3.00 MB)"));
        assert!(text.contains("Time: 12.3s"));
        assert!(text.ends_with("  asa: 2 files, 2.0 KB"));
    }

    #[test]
    fn file_stats_accumulate() {
        let mut s = FileStats::default();
        s.add(10);
        s.add(5);
        assert_eq!(s, FileStats { files: 2, bytes: 15 });
    }

    #[test]
    fn default_synth_config() {
        let c = SynthConfig::default();
        assert_eq!(c.voice, "ko-KR-SunHiNeural");
        assert_eq!(c.rate, None);
        assert_eq!(c.timeout_secs, 60);
    }
}
