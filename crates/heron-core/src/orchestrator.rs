//! Orchestration entry point: one batch of delta events in, one
//! deterministic outcome out.
//!
//! The pipeline is a pure synchronous computation. The only mutable state
//! is the caller-owned [`AdmissionState`] (dedupe set + cooldown map),
//! mutated in place so repeated calls sharing one state are cumulative.
//! Callers persist it between runs; concurrent callers must not share one
//! instance without external synchronization.

use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};
use tracing::debug;

use crate::clustering;
use crate::cooldown::{self, CooldownState, DEFAULT_COOLDOWN_WINDOW_HOURS};
use crate::dispatch;
use crate::error::{HeronError, HeronResult};
use crate::keys::{dedupe_key, normalize_artifact_id};
use crate::limiters::{self, DEFAULT_LINEAGE_DEPTH_CAP};
use crate::materiality;
use crate::policy::{self, CutoverPhase};
use crate::suppression::{Disposition, SuppressionReason};
use crate::telemetry::ShadowTelemetrySnapshot;
use crate::types::{ArtifactDeltaEvent, DispatchPacket, RegistrySnapshot};

/// The mode this orchestrator accepts. Everything else fails closed.
pub const TRIAL_MODE: &str = "trial";

/// Caller-owned mutable state, persisted across runs.
#[derive(Debug, Clone, Default)]
pub struct AdmissionState {
    /// Dedupe keys already processed.
    pub seen_dedupe_keys: HashSet<String>,
    /// Per-cluster cooldown records.
    pub cooldown: CooldownState,
}

/// Immutable per-run configuration and context.
#[derive(Debug, Clone)]
pub struct TrialOptions {
    /// Cutover phase controlling source-primary enforcement and shadow
    /// telemetry.
    pub phase: CutoverPhase,
    /// Standing registry snapshot, when available.
    pub registry: Option<RegistrySnapshot>,
    /// Artifact ids granted a manual override (normalized on use).
    pub manual_overrides: HashSet<String>,
    /// Maximum derivation depth admitted without an override.
    pub lineage_depth_cap: u32,
    /// Root-event ids exempt from the lineage cap.
    pub lineage_root_overrides: HashSet<String>,
    /// Cooldown window in hours.
    pub cooldown_window_hours: i64,
    /// Injected clock; all timestamps and dispatch ids derive from it.
    pub now: DateTime<Utc>,
}

impl TrialOptions {
    /// Default options at a given clock reading.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            phase: CutoverPhase::default(),
            registry: None,
            manual_overrides: HashSet::new(),
            lineage_depth_cap: DEFAULT_LINEAGE_DEPTH_CAP,
            lineage_root_overrides: HashSet::new(),
            cooldown_window_hours: DEFAULT_COOLDOWN_WINDOW_HOURS,
            now,
        }
    }
}

/// Result of one successful orchestration run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrialOutcome {
    /// Packets built this run, in deterministic order.
    pub dispatched: Vec<DispatchPacket>,
    /// Candidates suppressed by an active guard.
    pub suppressed: u64,
    /// Conservative no-ops (shape rejections and non-material deltas).
    pub noop: u64,
    /// Advisory warnings (fail-closed notices, shadow telemetry).
    pub warnings: Vec<String>,
    /// Full per-run counters.
    pub shadow_telemetry: ShadowTelemetrySnapshot,
}

/// Run the trial orchestrator over a batch of events.
///
/// Any mode other than the literal `"trial"` is rejected with zero side
/// effects. Events are pre-sorted by (artifact id, new hash) so repeated
/// runs over the same input set produce byte-identical dispatch-id
/// sequences regardless of input order.
pub fn run_trial(
    mode: &str,
    events: &[ArtifactDeltaEvent],
    state: &mut AdmissionState,
    options: &TrialOptions,
) -> HeronResult<TrialOutcome> {
    if mode != TRIAL_MODE {
        return Err(HeronError::mode_not_permitted(mode));
    }

    let mut ordered: Vec<&ArtifactDeltaEvent> = events.iter().collect();
    ordered.sort_by(|a, b| {
        (a.artifact_id.as_str(), a.after_sha.as_str())
            .cmp(&(b.artifact_id.as_str(), b.after_sha.as_str()))
    });

    let normalized_overrides: HashSet<String> = options
        .manual_overrides
        .iter()
        .map(|id| normalize_artifact_id(id))
        .collect();

    let mut telemetry = ShadowTelemetrySnapshot::new(options.phase);
    let mut root_event_ids: HashSet<String> = HashSet::new();
    let mut dispatched: Vec<DispatchPacket> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut suppressed = 0u64;
    let mut noop = 0u64;
    let mut missing_registry_count = 0u64;

    // Sequence counter seeded from sub-second precision; incremented per
    // admitted packet.
    let sequence_seed = options.now.nanosecond() / 1_000_000;

    for event in ordered {
        let disposition = process_event(
            event,
            state,
            options,
            &normalized_overrides,
            &mut telemetry,
            &mut root_event_ids,
            &mut warnings,
            &mut missing_registry_count,
            &mut dispatched,
            sequence_seed,
        );

        match disposition {
            Disposition::Admit => {}
            Disposition::Noop(reason) => {
                debug!(artifact_id = %event.artifact_id, reason = %reason, "noop");
                noop += 1;
                telemetry.record(reason);
            }
            Disposition::Suppress(reason) => {
                debug!(artifact_id = %event.artifact_id, reason = %reason, "suppressed");
                suppressed += 1;
                telemetry.record(reason);
            }
        }
    }

    telemetry.root_event_count = root_event_ids.len() as u64;
    telemetry.admitted_count = dispatched.len() as u64;

    if missing_registry_count > 0 {
        warnings.push(format!(
            "phase {} requires source-primary classification but no registry snapshot was \
             supplied; suppressed {} event(s)",
            options.phase, missing_registry_count
        ));
    }

    if options.phase.emits_shadow_telemetry() {
        warnings.push(telemetry.shadow_warning());
    }

    Ok(TrialOutcome {
        dispatched,
        suppressed,
        noop,
        warnings,
        shadow_telemetry: telemetry,
    })
}

/// Run one event through the gate pipeline, mutating run state as needed.
#[allow(clippy::too_many_arguments)]
fn process_event(
    event: &ArtifactDeltaEvent,
    state: &mut AdmissionState,
    options: &TrialOptions,
    overrides: &HashSet<String>,
    telemetry: &mut ShadowTelemetrySnapshot,
    root_event_ids: &mut HashSet<String>,
    warnings: &mut Vec<String>,
    missing_registry_count: &mut u64,
    dispatched: &mut Vec<DispatchPacket>,
    sequence_seed: u32,
) -> Disposition {
    // Admission shape checks.
    if event.after_sha.trim().is_empty() {
        return Disposition::Noop(SuppressionReason::EmptyAfterSha);
    }
    if event.before_sha.is_none() {
        return Disposition::Noop(SuppressionReason::FirstRegistration);
    }

    let key = dedupe_key(event);
    if state.seen_dedupe_keys.contains(&key) {
        return Disposition::Suppress(SuppressionReason::DuplicateEvent);
    }
    state.seen_dedupe_keys.insert(key);

    if event.sections().is_empty() {
        return Disposition::Noop(SuppressionReason::MissingChangedSections);
    }

    // The event is an admission candidate from here on.
    let identity = clustering::derive_identity(event);
    telemetry.candidate_count += 1;
    root_event_ids.insert(identity.root_event_id.clone());

    let material = materiality::is_material(event);

    if let Some(reason) = limiters::lineage_gate(
        identity.lineage_depth,
        options.lineage_depth_cap,
        &identity.root_event_id,
        &options.lineage_root_overrides,
    ) {
        return Disposition::Suppress(reason);
    }

    if let Some(reason) = limiters::self_trigger_gate(event.produced_by.as_deref(), material) {
        return Disposition::Suppress(reason);
    }

    let policy_outcome = policy::evaluate(event, options.phase, options.registry.as_ref(), overrides);
    if let Some(reason) = policy_outcome.suppression {
        if reason == SuppressionReason::MissingRegistryForSourcePrimary {
            // One aggregated warning per run; count here.
            *missing_registry_count += 1;
        } else if let Some(warning) = policy_outcome.warning {
            warnings.push(warning);
        }
        return Disposition::Suppress(reason);
    }

    // The generic non-material path counts as a conservative no-op; the
    // cooldown repeat path is an active suppression.
    if let Some(reason) = cooldown::evaluate(
        &state.cooldown,
        &identity.cluster_key,
        &identity.cluster_fingerprint,
        material,
        options.now,
        options.cooldown_window_hours,
    ) {
        return Disposition::from_reason(reason);
    }

    // Survived every gate: build the packet and stamp the cooldown record.
    let sequence = sequence_seed + dispatched.len() as u32 + 1;
    let packet = dispatch::build_packet(
        event,
        &identity,
        dispatch::build_dispatch_id(options.now, sequence),
        options.now,
    );
    cooldown::record_admission(
        &mut state.cooldown,
        &identity.cluster_key,
        &identity.cluster_fingerprint,
        options.now,
    );
    dispatched.push(packet);
    Disposition::Admit
}
