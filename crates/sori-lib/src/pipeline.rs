//! Run pipeline — load every subject, then synthesize and index them in turn.
//!
//! ```text
//! LoadingSubjects: for each subject
//!     record = data/<subject>.json          (missing → skipped)
//!     texts  = extract_texts(record)        ExtractingTexts
//!     jobs   = assign_filenames(texts)      DerivingFilenames
//! for each loaded subject, sequentially
//!     dispatch(jobs)                        SynthesizingBatch
//!     write manifest.json                   WritingManifest (only if every job succeeded)
//! Reporting → Done
//! ```
//!
//! All subjects are planned before any synthesis starts, so the progress total
//! covers the whole run from the first line.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use sori_core::extract::extract_texts;
use sori_core::filename::assign_filenames;
use sori_core::manifest::Manifest;
use sori_core::record::SubjectRecord;
use sori_core::types::{RunEvent, RunReport, RunState};

use crate::config::Config;
use crate::dispatch::{Dispatcher, Job, ProgressFn, RunContext};
use crate::error::{Result, SoriError};
use crate::loader::load_record;
use crate::manifest::write_manifest;
use crate::report::collect_report;
use crate::synth::Synthesizer;

/// Event callback for console output or other observers.
pub type EventFn = Arc<dyn Fn(RunEvent) + Send + Sync>;

/// Everything needed to produce one subject's audio.
#[derive(Debug, Clone)]
pub struct SubjectPlan {
    pub subject: String,
    pub dir: PathBuf,
    pub manifest: Manifest,
    pub jobs: Vec<Job>,
}

/// Turn a loaded record into its job list and manifest.
pub fn plan_subject(subject: &str, record: &SubjectRecord, dir: PathBuf) -> SubjectPlan {
    let texts = extract_texts(record);
    let assigned = assign_filenames(&texts);

    let jobs = assigned
        .iter()
        .map(|(text, filename)| Job {
            text: text.clone(),
            filename: filename.clone(),
            path: dir.join(filename),
        })
        .collect();

    SubjectPlan {
        subject: subject.to_string(),
        dir,
        manifest: assigned.into_iter().collect(),
        jobs,
    }
}

/// Result of a finished run.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Subjects whose batch failed (only non-empty with `keep_going`).
    pub failed: Vec<String>,
}

/// Drives a whole multi-subject run.
pub struct Generator {
    config: Config,
    dispatcher: Dispatcher,
    ctx: Arc<RunContext>,
    state_tx: watch::Sender<RunState>,
}

impl Generator {
    pub fn new(config: Config, synth: Arc<dyn Synthesizer>) -> Result<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(
            synth,
            config.synth.voice.clone(),
            config.synth.rate.clone(),
            config.concurrency,
            Duration::from_secs(config.synth.timeout_secs),
        );
        let (state_tx, _) = watch::channel(RunState::Idle);
        Ok(Self {
            config,
            dispatcher,
            ctx: RunContext::new(),
            state_tx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared run context; call [`RunContext::cancel`] on it to stop the run.
    pub fn context(&self) -> Arc<RunContext> {
        self.ctx.clone()
    }

    pub fn state(&self) -> RunState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes. The receiver sees the latest state only,
    /// so short-lived states may be skipped.
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: RunState) {
        self.state_tx.send_replace(state);
    }

    /// Load and plan one subject. `None` if its record does not exist.
    pub async fn plan(&self, subject: &str) -> Result<Option<SubjectPlan>> {
        self.set_state(RunState::LoadingSubjects);
        let Some(record) = load_record(&self.config.record_path(subject)).await? else {
            return Ok(None);
        };
        self.set_state(RunState::ExtractingTexts);
        let plan = plan_subject(subject, &record, self.config.subject_dir(subject));
        self.set_state(RunState::DerivingFilenames);
        Ok(Some(plan))
    }

    /// Run every configured subject and report.
    pub async fn run(&self, on_event: EventFn) -> Result<RunOutcome> {
        let start = Instant::now();

        let mut plans = Vec::new();
        for subject in &self.config.subjects {
            match self.plan(subject).await? {
                Some(plan) => {
                    self.ctx.add_total(plan.jobs.len());
                    plans.push(plan);
                }
                None => {
                    let path = self.config.record_path(subject);
                    warn!("skipping {subject}: {} not found", path.display());
                    on_event(RunEvent::SubjectSkipped {
                        subject: subject.clone(),
                        path: path.display().to_string(),
                    });
                }
            }
        }

        let mut failed = Vec::new();
        for plan in plans {
            let subject = plan.subject.clone();
            match self.process_subject(plan, &on_event).await {
                Ok(()) => {}
                Err(SoriError::BatchFailed { .. }) if self.config.keep_going => {
                    failed.push(subject);
                }
                Err(e) => return Err(e),
            }
        }

        self.set_state(RunState::Reporting);
        let report = collect_report(
            self.config.output_dir.clone(),
            self.config.subjects.clone(),
            start.elapsed(),
        )
        .await?;
        self.set_state(RunState::Done);
        info!(
            "run finished: {} files in {:.1}s",
            report.total.files,
            report.elapsed.as_secs_f64()
        );

        Ok(RunOutcome { report, failed })
    }

    /// Synthesize one subject's batch, then write its manifest.
    #[instrument(skip_all, fields(subject = %plan.subject, texts = plan.jobs.len()))]
    pub async fn process_subject(&self, plan: SubjectPlan, on_event: &EventFn) -> Result<()> {
        let SubjectPlan {
            subject,
            dir,
            manifest,
            jobs,
        } = plan;

        on_event(RunEvent::SubjectPlanned {
            subject: subject.clone(),
            texts: jobs.len(),
        });

        self.set_state(RunState::SynthesizingBatch);
        let total = jobs.len();
        let progress: ProgressFn = {
            let on_event = on_event.clone();
            Arc::new(move |p| on_event(RunEvent::Synthesized(p)))
        };
        let results = self.dispatcher.dispatch(&subject, jobs, &self.ctx, &progress).await;

        if self.ctx.is_cancelled() {
            warn!("run cancelled, manifest not written");
            return Err(SoriError::Cancelled);
        }

        let succeeded = results.iter().filter(|r| r.outcome.is_ok()).count();
        if succeeded < total {
            let failed = total - succeeded;
            warn!("{failed} of {total} syntheses failed");
            on_event(RunEvent::SubjectFailed {
                subject: subject.clone(),
                failed,
                total,
            });
            return Err(SoriError::BatchFailed {
                subject,
                failed,
                total,
            });
        }

        self.set_state(RunState::WritingManifest);
        write_manifest(&dir, &manifest).await?;
        info!("manifest written ({} entries)", manifest.len());
        on_event(RunEvent::ManifestWritten {
            subject,
            entries: manifest.len(),
        });
        Ok(())
    }
}
