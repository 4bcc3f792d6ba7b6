//! Per-run shadow telemetry: suppression counters and summary warnings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::policy::CutoverPhase;
use crate::suppression::SuppressionReason;

/// Aggregate counters for one orchestration run.
///
/// The suppression map always contains every known reason, zero-defaulted,
/// so downstream consumers never need to distinguish "absent" from "zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowTelemetrySnapshot {
    pub phase: CutoverPhase,
    /// Distinct root events among admission candidates.
    pub root_event_count: u64,
    /// Events that survived the admission shape checks.
    pub candidate_count: u64,
    /// Packets actually built.
    pub admitted_count: u64,
    pub suppression_reason_counts: BTreeMap<SuppressionReason, u64>,
}

impl ShadowTelemetrySnapshot {
    /// Create an empty snapshot with the complete zeroed reason map.
    pub fn new(phase: CutoverPhase) -> Self {
        Self {
            phase,
            root_event_count: 0,
            candidate_count: 0,
            admitted_count: 0,
            suppression_reason_counts: SuppressionReason::iter().map(|r| (r, 0)).collect(),
        }
    }

    /// Increment the counter for one attributed reason.
    pub fn record(&mut self, reason: SuppressionReason) {
        *self.suppression_reason_counts.entry(reason).or_insert(0) += 1;
    }

    /// Total suppressions across all reasons (no-ops included).
    pub fn total_suppressed(&self) -> u64 {
        self.suppression_reason_counts.values().sum()
    }

    /// One advisory line summarizing the run, emitted as a warning when the
    /// phase calls for shadow telemetry.
    pub fn shadow_warning(&self) -> String {
        let breakdown: Vec<String> = self
            .suppression_reason_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(reason, count)| format!("{reason}={count}"))
            .collect();
        format!(
            "shadow telemetry [{}]: root_events={} candidates={} admitted={} suppressed=[{}]",
            self.phase,
            self.root_event_count,
            self.candidate_count,
            self.admitted_count,
            breakdown.join(", ")
        )
    }
}
