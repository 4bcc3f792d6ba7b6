//! Phase-dependent policy gate backed by the standing artifact registry.
//!
//! Cutover phases P0-P3 control two independent behaviors: whether events
//! must be registry-classified as source-primary, and whether shadow
//! telemetry is surfaced as a warning. The registry checks themselves run
//! whenever a snapshot is supplied, regardless of phase.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::warn;

use crate::keys::normalize_artifact_id;
use crate::suppression::SuppressionReason;
use crate::types::{ArtifactDeltaEvent, RegistrySnapshot, TriggerPolicy};
use crate::vocab;

/// Registry-enforcement cutover phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum CutoverPhase {
    /// Registry checks only when a snapshot happens to be supplied.
    #[default]
    P0,
    /// Same admission behavior as P0, plus shadow telemetry.
    P1,
    /// Source-primary enforcement, still shadowed by telemetry.
    P2,
    /// Full source-primary enforcement.
    P3,
}

impl CutoverPhase {
    /// Whether events must be registry-classified as source-primary.
    pub fn requires_source_primary(&self) -> bool {
        matches!(self, Self::P2 | Self::P3)
    }

    /// Whether a shadow-telemetry warning is emitted for the run.
    pub fn emits_shadow_telemetry(&self) -> bool {
        matches!(self, Self::P1 | Self::P2)
    }
}

/// Result of the policy gate for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    /// Suppression to apply, or `None` to admit.
    pub suppression: Option<SuppressionReason>,
    /// Run-level warning to surface, when the gate failed closed.
    pub warning: Option<String>,
}

impl PolicyOutcome {
    fn admit() -> Self {
        Self {
            suppression: None,
            warning: None,
        }
    }

    fn suppress(reason: SuppressionReason) -> Self {
        Self {
            suppression: Some(reason),
            warning: None,
        }
    }

    fn suppress_with_warning(reason: SuppressionReason, warning: String) -> Self {
        Self {
            suppression: Some(reason),
            warning: Some(warning),
        }
    }
}

/// Run the phase-dependent policy gate for one event.
///
/// `manual_overrides` holds normalized artifact ids granted an operator
/// override for this run.
pub fn evaluate(
    event: &ArtifactDeltaEvent,
    phase: CutoverPhase,
    registry: Option<&RegistrySnapshot>,
    manual_overrides: &HashSet<String>,
) -> PolicyOutcome {
    let artifact_id = normalize_artifact_id(&event.artifact_id);
    let overridden = manual_overrides.contains(&artifact_id);
    let source_primary_required = phase.requires_source_primary();

    let Some(registry) = registry else {
        if source_primary_required {
            warn!(
                artifact_id = %artifact_id,
                phase = %phase,
                "source-primary enforcement without a registry snapshot; failing closed"
            );
            return PolicyOutcome::suppress_with_warning(
                SuppressionReason::MissingRegistryForSourcePrimary,
                format!(
                    "phase {phase} requires source-primary classification but no registry \
                     snapshot was supplied; suppressing {artifact_id}"
                ),
            );
        }
        return PolicyOutcome::admit();
    };

    let Some(entry) = registry.lookup(&artifact_id) else {
        warn!(artifact_id = %artifact_id, "unknown artifact; failing closed");
        return PolicyOutcome::suppress_with_warning(
            SuppressionReason::UnknownArtifact,
            format!("artifact {artifact_id} is not in the registry; suppressed (fail closed)"),
        );
    };

    if !entry.active {
        return PolicyOutcome::suppress(SuppressionReason::InactiveArtifact);
    }

    // Packs must not trigger work on their own; only their underlying
    // sources may.
    if source_primary_required
        && !overridden
        && vocab::is_pack_artifact(&artifact_id, &event.path)
    {
        return PolicyOutcome::suppress(SuppressionReason::PackWithoutSourceDelta);
    }

    if entry.artifact_class.is_derived() && !(source_primary_required && overridden) {
        return PolicyOutcome::suppress(SuppressionReason::ProjectionImmunity);
    }

    if source_primary_required && !entry.artifact_class.is_source_primary() && !overridden {
        return PolicyOutcome::suppress(SuppressionReason::TriggerPolicyBlocked);
    }

    if overridden {
        if entry.trigger_policy == TriggerPolicy::Never {
            return PolicyOutcome::suppress(SuppressionReason::TriggerPolicyBlocked);
        }
    } else if entry.trigger_policy != TriggerPolicy::Eligible {
        return PolicyOutcome::suppress(SuppressionReason::TriggerPolicyBlocked);
    }

    PolicyOutcome::admit()
}
