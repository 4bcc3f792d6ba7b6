//! Suppression taxonomy and per-event dispositions.
//!
//! Every delta that does not produce a packet is attributed to exactly one
//! named reason, so downstream audits can answer "why did this edit produce
//! no action". Reasons split into two families: conservative no-ops
//! (malformed shape, or nothing substantive to act on) and suppressions
//! (an active guard gated a live candidate).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Why a delta produced no dispatch packet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// New-hash field was empty; nothing observable changed.
    EmptyAfterSha,
    /// No previous hash: a brand-new artifact cannot have a delta yet.
    FirstRegistration,
    /// Dedupe key already present in the caller-supplied seen set.
    DuplicateEvent,
    /// No changed-section evidence was supplied.
    MissingChangedSections,
    /// Lineage depth exceeded the cap without a root-event override.
    LineageDepthCapExceeded,
    /// Non-material delta produced by a self-triggering process.
    AntiSelfTriggerNonMaterial,
    /// Non-material repeat of an already-admitted cluster inside the window.
    CooldownNonMaterial,
    /// Non-material delta with nothing to act on.
    NonMaterialDelta,
    /// Source-primary enforcement active but no registry snapshot supplied.
    MissingRegistryForSourcePrimary,
    /// Artifact id absent from the registry (fail closed).
    UnknownArtifact,
    /// Registry marks the artifact inactive.
    InactiveArtifact,
    /// Aggregate/rollup pack edit without an underlying source delta.
    PackWithoutSourceDelta,
    /// Derived/observational artifact class (projection immunity).
    ProjectionImmunity,
    /// Trigger policy does not admit this artifact.
    TriggerPolicyBlocked,
}

impl SuppressionReason {
    /// No-op reasons: the event either never became an admission candidate
    /// or carried nothing to act on. Everything else is an active guard
    /// suppressing a live candidate.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::EmptyAfterSha
                | Self::FirstRegistration
                | Self::MissingChangedSections
                | Self::NonMaterialDelta
        )
    }
}

/// Outcome of running one event through the gate pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Event survived every gate; build a packet.
    Admit,
    /// Conservative no-op: nothing to act on.
    Noop(SuppressionReason),
    /// Candidate was suppressed by an active guard.
    Suppress(SuppressionReason),
}

impl Disposition {
    /// Classify a reason into the disposition family it belongs to.
    pub fn from_reason(reason: SuppressionReason) -> Self {
        if reason.is_noop() {
            Self::Noop(reason)
        } else {
            Self::Suppress(reason)
        }
    }

    /// The attributed reason, if any.
    pub fn reason(&self) -> Option<SuppressionReason> {
        match self {
            Self::Admit => None,
            Self::Noop(reason) | Self::Suppress(reason) => Some(*reason),
        }
    }
}
