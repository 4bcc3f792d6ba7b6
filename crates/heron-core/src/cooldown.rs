//! Cooldown controller: suppress noisy non-material repeats per cluster.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::suppression::SuppressionReason;

/// Default cooldown window.
pub const DEFAULT_COOLDOWN_WINDOW_HOURS: i64 = 72;

/// Per-cluster record of the last admission.
///
/// Upserted by the orchestrator on every successful packet build; persisted
/// across runs by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCooldownEntry {
    /// When this cluster last produced a packet.
    pub last_admitted_at: DateTime<Utc>,
    /// Fingerprint that was admitted.
    pub cluster_fingerprint: String,
}

/// Cooldown state keyed by cluster key. BTreeMap keeps persisted JSON
/// deterministic across runs.
pub type CooldownState = BTreeMap<String, ClusterCooldownEntry>;

/// Evaluate the cooldown and generic materiality gates for one candidate.
///
/// Material deltas always pass. A non-material delta is suppressed as
/// `cooldown_non_material` when it repeats an admitted fingerprint inside
/// the window, and as `non_material_delta` otherwise (the generic
/// "nothing to act on" path).
pub fn evaluate(
    state: &CooldownState,
    cluster_key: &str,
    cluster_fingerprint: &str,
    material: bool,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Option<SuppressionReason> {
    if material {
        return None;
    }

    if let Some(entry) = state.get(cluster_key) {
        let within_window = now - entry.last_admitted_at < Duration::hours(window_hours);
        if entry.cluster_fingerprint == cluster_fingerprint && within_window {
            return Some(SuppressionReason::CooldownNonMaterial);
        }
    }

    Some(SuppressionReason::NonMaterialDelta)
}

/// Record an admission for a cluster, unconditionally replacing any prior
/// record.
pub fn record_admission(
    state: &mut CooldownState,
    cluster_key: &str,
    cluster_fingerprint: &str,
    now: DateTime<Utc>,
) {
    state.insert(
        cluster_key.to_string(),
        ClusterCooldownEntry {
            last_admitted_at: now,
            cluster_fingerprint: cluster_fingerprint.to_string(),
        },
    );
}
