//! Dispatch packet schemas (`dispatch.v1` / `dispatch.v2`).
//!
//! Packets are append-only once created: the core builds them, downstream
//! routing/queueing systems consume them. `queue_state` is informational
//! metadata for the downstream queue, not state this core maintains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Schema tag for v1 packets.
pub const SCHEMA_V1: &str = "dispatch.v1";
/// Schema tag for v2 packets.
pub const SCHEMA_V2: &str = "dispatch.v2";

/// What produced the dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Emitted by the artifact-delta admission pipeline.
    ArtifactDelta,
    /// Captured directly from an operator.
    OperatorIdea,
}

/// Downstream workflow a packet is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
pub enum RecommendedRoute {
    /// Fact-finding workflow (tier-1 semantic deltas).
    #[serde(rename = "lp-do-fact-find")]
    #[strum(serialize = "lp-do-fact-find")]
    FactFind,
    /// Briefing workflow (everything else that survives admission).
    #[serde(rename = "lp-do-briefing")]
    #[strum(serialize = "lp-do-briefing")]
    Briefing,
}

/// Packet status vocabulary.
///
/// Only the two `*_ready` states are routable. `auto_executed` is reserved
/// and must be rejected by the routing adapter; `logged_no_action` is a
/// terminal conservative no-op.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    FactFindReady,
    BriefingReady,
    AutoExecuted,
    LoggedNoAction,
}

/// Packet priority band. The builder emits `P2` for every packet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

/// Queue lifecycle state carried on the packet for the downstream system.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Enqueued,
    Processed,
    Error,
    Skipped,
}

/// Provisional deliverable family for the fact-find intake contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DeliverableFamily {
    BusinessArtifact,
    CodeChange,
    Doc,
    Multi,
    Design,
    Infra,
}

/// Provenance of the v2 `why` narrative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WhySource {
    /// Authored by the operator.
    Operator,
    /// Auto-generated fallback; excluded from operator-quality metrics.
    Auto,
}

/// Typed intended outcome carried by v2 packets.
///
/// `kind` and `source` stay as raw strings: packets cross a JSON boundary
/// and the v2 validator reports bad vocabulary as findings instead of
/// failing the parse (see [`crate::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntendedOutcome {
    /// Outcome type: `measurable` or `operational`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The outcome statement itself.
    pub statement: String,
    /// Provenance: `operator` or `auto`.
    pub source: String,
}

/// Dispatch packet, schema `dispatch.v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPacket {
    /// Literal schema tag; `dispatch.v1` for packets built by this core.
    pub schema_version: String,
    /// Run-unique dispatch id (`IDEA-DISPATCH-<ts>-<seq>`). Callers needing
    /// cross-process uniqueness must additionally dedupe on content.
    pub dispatch_id: String,
    /// Orchestration mode that produced the packet.
    pub mode: String,
    pub business: String,
    pub trigger: TriggerKind,
    pub artifact_id: String,
    pub before_sha: Option<String>,
    pub after_sha: String,
    pub root_event_id: String,
    pub anchor_key: String,
    pub cluster_key: String,
    pub cluster_fingerprint: String,
    pub lineage_depth: u32,
    pub area_anchor: String,
    /// Location anchors for downstream intake; non-empty for built packets.
    pub location_anchors: Vec<String>,
    pub provisional_deliverable_family: DeliverableFamily,
    /// Auto-generated summary of what changed.
    pub current_truth: String,
    /// What to do next, phrased for the routed workflow.
    pub next_scope_now: String,
    /// Adjacent follow-ups deferred for later.
    pub adjacent_later: Vec<String>,
    pub recommended_route: RecommendedRoute,
    pub status: DispatchStatus,
    pub priority: Priority,
    pub confidence: f64,
    /// Evidence references; non-empty for built packets.
    pub evidence_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub queue_state: QueueState,
}

/// Dispatch packet, schema `dispatch.v2`: v1 plus the `why` narrative and a
/// typed intended outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPacketV2 {
    #[serde(flatten)]
    pub base: DispatchPacket,
    /// Justification for why this work is happening now.
    pub why: String,
    /// Provenance of `why`.
    pub why_source: WhySource,
    /// Typed intended outcome; may be unset on upgraded v1 packets until an
    /// operator authors one.
    pub intended_outcome: Option<IntendedOutcome>,
}

impl DispatchPacketV2 {
    /// Lossless v1 → v2 upgrade: `current_truth` becomes `why` with
    /// provenance `auto`; the intended outcome is left unset. The reverse
    /// direction is not provided.
    pub fn upgrade_v1(packet: DispatchPacket) -> Self {
        let why = packet.current_truth.clone();
        let mut base = packet;
        base.schema_version = SCHEMA_V2.to_string();
        Self {
            base,
            why,
            why_source: WhySource::Auto,
            intended_outcome: None,
        }
    }
}
