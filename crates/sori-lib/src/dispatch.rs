//! Synthesis dispatcher — one subject's batch through a fixed worker pool.
//!
//! ```text
//! jobs → [job_tx] → worker_0: mkdir -p, synthesize, bump progress
//!                 → worker_1: ...
//!                 → worker_{n-1}
//!      ← per-job results, joined once the queue drains
//! ```
//!
//! `concurrency` workers share one job channel, so at most that many
//! synthesis calls are ever in flight; the rest wait in the queue. A failed
//! job does not stop its siblings. Every job reports its own outcome and the
//! caller decides what a failure means for the subject.
//!
//! Cancellation: [`RunContext::cancel`] makes workers drop every job they
//! have not started yet. Calls already in flight run to completion.
//! A call that outlives the timeout is dropped and its `.partial` removed.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use sori_core::types::{Progress, SynthRequest};

use crate::discard_partial;
use crate::error::{Result, SoriError};
use crate::synth::Synthesizer;

/// Progress callback, invoked once per finished synthesis.
pub type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// Counters and cancel flag shared by every batch of a run.
#[derive(Debug, Default)]
pub struct RunContext {
    completed: AtomicUsize,
    total: AtomicUsize,
    cancelled: AtomicBool,
}

impl RunContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Grow the run-wide total by `n` planned syntheses.
    pub fn add_total(&self, n: usize) {
        self.total.fetch_add(n, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Record one finished synthesis and return the new count.
    fn complete_one(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// One text to synthesize and where its audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub text: String,
    pub filename: String,
    pub path: PathBuf,
}

/// Outcome of a single job.
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub outcome: Result<()>,
}

/// Runs batches against a [`Synthesizer`] with a fixed voice and rate.
#[derive(Clone)]
pub struct Dispatcher {
    synth: Arc<dyn Synthesizer>,
    voice: String,
    rate: Option<String>,
    concurrency: usize,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        synth: Arc<dyn Synthesizer>,
        voice: impl Into<String>,
        rate: Option<String>,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            synth,
            voice: voice.into(),
            rate,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Synthesize every job of `subject`'s batch and wait for all of them.
    ///
    /// Results come back sorted by filename. A worker that panics loses its
    /// results, so callers should compare successes against the job count.
    pub async fn dispatch(
        &self,
        subject: &str,
        jobs: Vec<Job>,
        ctx: &Arc<RunContext>,
        on_progress: &ProgressFn,
    ) -> Vec<JobResult> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let job_count = jobs.len();
        let (job_tx, job_rx) = mpsc::channel::<Job>(job_count);
        for job in jobs {
            // Capacity equals job count, so this never waits.
            let _ = job_tx.send(job).await;
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let workers = self.concurrency.min(job_count);
        debug!("{subject}: dispatching {job_count} jobs on {workers} workers");

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let worker = Worker {
                id: i,
                subject: subject.to_string(),
                dispatcher: self.clone(),
                job_rx: job_rx.clone(),
                ctx: ctx.clone(),
                on_progress: on_progress.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        let mut results = Vec::with_capacity(job_count);
        for handle in handles {
            match handle.await {
                Ok(batch) => results.extend(batch),
                Err(e) => error!("{subject}: synthesis worker died: {e}"),
            }
        }

        results.sort_by(|a, b| a.job.filename.cmp(&b.job.filename));
        results
    }

    async fn run_job(&self, job: &Job) -> Result<()> {
        if let Some(dir) = job.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(SoriError::io("failed to create", dir))?;
        }

        let request = SynthRequest {
            text: job.text.clone(),
            voice: self.voice.clone(),
            rate: self.rate.clone(),
        };

        let call = self.synth.synthesize(&request, &job.path);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                // The dropped call never reached its own cleanup
                discard_partial(&job.path).await;
                Err(SoriError::Timeout(self.timeout))
            }
        }
    }
}

// ─── Worker task (concurrency instances share the job channel) ────────────

struct Worker {
    id: usize,
    subject: String,
    dispatcher: Dispatcher,
    job_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    ctx: Arc<RunContext>,
    on_progress: ProgressFn,
}

impl Worker {
    async fn run(self) -> Vec<JobResult> {
        let mut results = Vec::new();

        loop {
            // Only one worker holds the lock while taking the next job
            let job = {
                let mut rx = self.job_rx.lock().await;
                rx.recv().await
            };
            let Some(job) = job else {
                break; // queue drained
            };

            if self.ctx.is_cancelled() {
                debug!("worker[{}]: cancelled, dropping {}", self.id, job.filename);
                results.push(JobResult {
                    job,
                    outcome: Err(SoriError::Cancelled),
                });
                continue;
            }

            let outcome = self.dispatcher.run_job(&job).await;
            match &outcome {
                Ok(()) => {
                    let current = self.ctx.complete_one();
                    (self.on_progress)(Progress {
                        current,
                        total: self.ctx.total(),
                        subject: self.subject.clone(),
                        filename: job.filename.clone(),
                        text: job.text.clone(),
                    });
                }
                Err(e) => {
                    error!("worker[{}]: {}/{} failed: {e}", self.id, self.subject, job.filename);
                }
            }
            results.push(JobResult { job, outcome });
        }

        results
    }
}
