//! sori CLI — pre-generate pronunciation audio for lesson data.
//!
//! ```text
//! sori [generate] [--config sori.json] [--subject asa ...] [--voice ...] [--rate -10%]
//! sori extract asa        # list filename/text pairs without synthesizing
//! sori report             # summarize what is already on disk
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use sori_lib::config::Config;
use sori_lib::pipeline::{EventFn, Generator};
use sori_lib::report::collect_report;
use sori_lib::sori_core::types::RunEvent;
use sori_lib::synth::HttpSynthesizer;
use sori_lib::{Result, SoriError};

/// sori — lesson text to pronunciation audio
#[derive(Parser)]
#[command(name = "sori", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    overrides: Overrides,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize audio and manifests for every subject (default)
    Generate,
    /// Print the filename plan for one subject without synthesizing
    Extract {
        /// Subject identifier
        subject: String,
    },
    /// Summarize audio already in the output directory
    Report,
}

/// Settings that override the config file.
#[derive(Args)]
struct Overrides {
    /// Path to the JSON config file (default: ./sori.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding <subject>.json records
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Root output directory for audio
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Subject to process (repeatable; replaces the configured list)
    #[arg(long = "subject", global = true)]
    subjects: Vec<String>,
    /// TTS voice
    #[arg(long, global = true)]
    voice: Option<String>,
    /// Speaking rate, e.g. "-20%"
    #[arg(long, global = true, allow_hyphen_values = true)]
    rate: Option<String>,
    /// Speech server base URL
    #[arg(long, global = true)]
    server: Option<String>,
    /// Maximum concurrent synthesis calls
    #[arg(long, global = true)]
    concurrency: Option<usize>,
    /// Continue with the next subject when a batch fails
    #[arg(long, global = true)]
    keep_going: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if !self.subjects.is_empty() {
            config.subjects = self.subjects;
        }
        if let Some(voice) = self.voice {
            config.synth.voice = voice;
        }
        if let Some(rate) = self.rate {
            config.synth.rate = Some(rate);
        }
        if let Some(server) = self.server {
            config.synth.base_url = server;
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n;
        }
        if self.keep_going {
            config.keep_going = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries progress and the summary.
    let filter = if cli.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.overrides.config.as_deref())?;
    cli.overrides.apply(&mut config);

    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => generate(config).await,
        Command::Extract { subject } => extract(config, &subject).await,
        Command::Report => {
            let report = collect_report(config.output_dir, config.subjects, Duration::ZERO).await?;
            println!("{report}");
            Ok(())
        }
    }
}

async fn generate(config: Config) -> Result<()> {
    println!("sori lesson audio generator");
    println!("Voice: {}", config.synth.voice);
    println!("Output: {}", config.output_dir.display());

    let synth = Arc::new(HttpSynthesizer::new(&config.synth));
    let generator = Generator::new(config, synth)?;

    let ctx = generator.context();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight syntheses");
            ctx.cancel();
        }
    });

    let mut state_rx = generator.subscribe_state();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            debug!("state: {:?}", *state_rx.borrow_and_update());
        }
    });

    let on_event: EventFn = Arc::new(|event: RunEvent| println!("  {event}"));
    let outcome = generator.run(on_event).await?;

    println!("\n{}", outcome.report);
    if !outcome.failed.is_empty() {
        return Err(SoriError::SubjectsFailed(outcome.failed.len()));
    }
    info!("all subjects complete");
    Ok(())
}

async fn extract(config: Config, subject: &str) -> Result<()> {
    let synth = Arc::new(HttpSynthesizer::new(&config.synth));
    let generator = Generator::new(config, synth)?;

    let Some(plan) = generator.plan(subject).await? else {
        let path = generator.config().record_path(subject);
        println!("Skipping {subject}: {} not found", path.display());
        return Ok(());
    };

    for job in &plan.jobs {
        println!("{}\t{}", job.filename, job.text);
    }
    println!("{subject}: {} unique texts", plan.jobs.len());
    Ok(())
}
