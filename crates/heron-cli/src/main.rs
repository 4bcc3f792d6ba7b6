//! heron - single-event CLI for the delta admission core.
//!
//! Builds one [`ArtifactDeltaEvent`] from flags, runs one orchestration
//! call, and prints the JSON-serialized result to stdout. Logs go to
//! stderr; stdout is reserved for JSON.
//!
//! Exit codes: 0 on success, 1 on orchestration failure, 2 (from clap) on
//! invalid invocation.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use heron_core::{
    run_trial, AdmissionState, ArtifactDeltaEvent, CutoverPhase, HeronError, HeronResult,
    RegistryDocument, RegistrySnapshot, TrialOptions, TrialOutcome,
};

#[derive(Parser)]
#[command(name = "heron")]
#[command(about = "Artifact-delta admission and dispatch engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Orchestration mode; only "trial" is accepted
    #[arg(long)]
    mode: String,

    /// Cutover phase (P0-P3)
    #[arg(long, default_value = "P0")]
    phase: String,

    /// Owning business code
    #[arg(long)]
    business: String,

    /// Artifact identifier
    #[arg(long)]
    artifact_id: String,

    /// Previous content hash; omit for a first registration
    #[arg(long)]
    before_sha: Option<String>,

    /// New content hash
    #[arg(long)]
    after_sha: String,

    /// Repository path of the artifact file
    #[arg(long)]
    path: String,

    /// Domain tag (MARKET, SELL, ...)
    #[arg(long)]
    domain: Option<String>,

    /// Changed-section heading; repeat for multiple sections
    #[arg(long = "section")]
    sections: Vec<String>,

    /// Id of the process that produced the edit
    #[arg(long)]
    produced_by: Option<String>,

    /// Registry snapshot JSON file ({"artifacts": [...]})
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Manual-override artifact id; repeatable
    #[arg(long = "override")]
    overrides: Vec<String>,

    /// Maximum lineage depth admitted without an override
    #[arg(long, default_value_t = heron_core::DEFAULT_LINEAGE_DEPTH_CAP)]
    lineage_depth_cap: u32,

    /// Cooldown window in hours
    #[arg(long, default_value_t = heron_core::DEFAULT_COOLDOWN_WINDOW_HOURS)]
    cooldown_window_hours: i64,

    /// Enable verbose logging (stderr)
    #[arg(short, long)]
    verbose: bool,
}

/// JSON envelope for a successful run.
#[derive(Serialize)]
struct OkEnvelope<'a> {
    ok: bool,
    #[serde(flatten)]
    outcome: &'a TrialOutcome,
}

/// JSON envelope for a failed run.
#[derive(Serialize)]
struct ErrorEnvelope {
    ok: bool,
    error: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(outcome) => {
            let envelope = OkEnvelope {
                ok: true,
                outcome: &outcome,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&envelope).expect("outcome must serialize")
            );
        }
        Err(err) => {
            let envelope = ErrorEnvelope {
                ok: false,
                error: err.to_string(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&envelope).expect("error envelope must serialize")
            );
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> HeronResult<TrialOutcome> {
    let phase: CutoverPhase = cli
        .phase
        .parse()
        .map_err(|_| HeronError::invocation(format!("unknown cutover phase \"{}\"", cli.phase)))?;

    let registry = cli
        .registry
        .as_deref()
        .map(load_registry)
        .transpose()?;

    let event = ArtifactDeltaEvent {
        artifact_id: cli.artifact_id.clone(),
        business: cli.business.clone(),
        before_sha: cli.before_sha.clone(),
        after_sha: cli.after_sha.clone(),
        path: cli.path.clone(),
        domain: cli.domain.clone(),
        changed_sections: if cli.sections.is_empty() {
            None
        } else {
            Some(cli.sections.clone())
        },
        produced_by: cli.produced_by.clone(),
        ..Default::default()
    };
    debug!(artifact_id = %event.artifact_id, "running single-event trial");

    let options = TrialOptions {
        phase,
        registry,
        manual_overrides: cli.overrides.iter().cloned().collect::<HashSet<String>>(),
        lineage_depth_cap: cli.lineage_depth_cap,
        cooldown_window_hours: cli.cooldown_window_hours,
        ..TrialOptions::at(Utc::now())
    };

    let mut state = AdmissionState::default();
    run_trial(&cli.mode, &[event], &mut state, &options)
}

fn load_registry(path: &std::path::Path) -> HeronResult<RegistrySnapshot> {
    let raw = fs::read_to_string(path)?;
    let document: RegistryDocument = serde_json::from_str(&raw).map_err(|err| {
        HeronError::registry(format!("failed to parse {}: {err}", path.display()))
    })?;
    Ok(RegistrySnapshot::from_document(document))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
