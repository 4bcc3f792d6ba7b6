//! Dispatch packet construction and routing classification.

use chrono::{DateTime, Utc};

use crate::clustering::ClusterIdentity;
use crate::keys::short_sha;
use crate::types::{
    ArtifactDeltaEvent, DeliverableFamily, DispatchPacket, DispatchStatus, Priority, QueueState,
    RecommendedRoute, TriggerKind, SCHEMA_V1,
};
use crate::vocab;

/// Confidence assigned to tier-1 semantic matches.
pub const T1_CONFIDENCE: f64 = 0.75;
/// Baseline confidence for everything else that survives admission.
pub const BASELINE_CONFIDENCE: f64 = 0.5;

/// Build a run-scoped dispatch id from the clock and a sequence number.
///
/// Format: `IDEA-DISPATCH-<YYYYMMDDHHMMSS>-<NNNN>`. The caller seeds the
/// sequence from sub-second clock precision to reduce (not eliminate)
/// cross-run collisions at full-second granularity.
pub fn build_dispatch_id(now: DateTime<Utc>, sequence: u32) -> String {
    format!(
        "IDEA-DISPATCH-{}-{:04}",
        now.format("%Y%m%d%H%M%S"),
        sequence
    )
}

/// Route classification: tier-1 semantic deltas go to fact-finding with
/// higher confidence, everything else to briefing at baseline.
pub fn classify_route(sections: &[String]) -> (RecommendedRoute, DispatchStatus, f64) {
    if sections.iter().any(|heading| vocab::is_t1_heading(heading)) {
        (
            RecommendedRoute::FactFind,
            DispatchStatus::FactFindReady,
            T1_CONFIDENCE,
        )
    } else {
        (
            RecommendedRoute::Briefing,
            DispatchStatus::BriefingReady,
            BASELINE_CONFIDENCE,
        )
    }
}

/// Assemble the v1 packet for an admitted event.
pub fn build_packet(
    event: &ArtifactDeltaEvent,
    identity: &ClusterIdentity,
    dispatch_id: String,
    now: DateTime<Utc>,
) -> DispatchPacket {
    let (route, status, confidence) = classify_route(event.sections());

    let current_truth = format!(
        "{} changed ({} → {})",
        event.artifact_id,
        short_sha(event.before_sha.as_deref().unwrap_or("")),
        short_sha(&event.after_sha)
    );

    let next_scope_now = match route {
        RecommendedRoute::FactFind => format!(
            "Investigate {} delta for {}",
            identity.area_anchor, event.business
        ),
        RecommendedRoute::Briefing => format!(
            "Understand {} delta for {}",
            identity.area_anchor, event.business
        ),
    };

    DispatchPacket {
        schema_version: SCHEMA_V1.to_string(),
        dispatch_id,
        mode: "trial".to_string(),
        business: event.business.clone(),
        trigger: TriggerKind::ArtifactDelta,
        artifact_id: event.artifact_id.clone(),
        before_sha: event.before_sha.clone(),
        after_sha: event.after_sha.clone(),
        root_event_id: identity.root_event_id.clone(),
        anchor_key: identity.anchor_key.clone(),
        cluster_key: identity.cluster_key.clone(),
        cluster_fingerprint: identity.cluster_fingerprint.clone(),
        lineage_depth: identity.lineage_depth,
        area_anchor: identity.area_anchor.clone(),
        location_anchors: vec![event.path.clone()],
        provisional_deliverable_family: DeliverableFamily::BusinessArtifact,
        current_truth,
        next_scope_now,
        adjacent_later: vec![],
        recommended_route: route,
        status,
        priority: Priority::P2,
        confidence,
        evidence_refs: identity.evidence_refs.clone(),
        created_at: now,
        queue_state: QueueState::Enqueued,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::derive_identity;

    fn fixed_now() -> DateTime<Utc> {
        "2026-02-24T15:30:00Z".parse().unwrap()
    }

    fn t1_event() -> ArtifactDeltaEvent {
        ArtifactDeltaEvent {
            artifact_id: "HBAG-SELL-PACK".to_string(),
            business: "HBAG".to_string(),
            before_sha: Some("abc1234".to_string()),
            after_sha: "def5678".to_string(),
            path: "docs/strategy/HBAG/sell-pack.user.md".to_string(),
            domain: Some("SELL".to_string()),
            changed_sections: Some(vec![
                "ICP Definition".to_string(),
                "Target Customer Profile".to_string(),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_dispatch_id_encodes_clock_and_sequence() {
        assert_eq!(
            build_dispatch_id(fixed_now(), 1),
            "IDEA-DISPATCH-20260224153000-0001"
        );
        assert_eq!(
            build_dispatch_id(fixed_now(), 42),
            "IDEA-DISPATCH-20260224153000-0042"
        );
    }

    #[test]
    fn test_t1_match_routes_to_fact_find() {
        let (route, status, confidence) = classify_route(t1_event().sections());
        assert_eq!(route, RecommendedRoute::FactFind);
        assert_eq!(status, DispatchStatus::FactFindReady);
        assert_eq!(confidence, T1_CONFIDENCE);
    }

    #[test]
    fn test_non_t1_routes_to_briefing() {
        let sections = vec![
            "Competitor Table".to_string(),
            "Distribution Notes".to_string(),
        ];
        let (route, status, confidence) = classify_route(&sections);
        assert_eq!(route, RecommendedRoute::Briefing);
        assert_eq!(status, DispatchStatus::BriefingReady);
        assert_eq!(confidence, BASELINE_CONFIDENCE);
    }

    #[test]
    fn test_packet_fields() {
        let event = t1_event();
        let identity = derive_identity(&event);
        let packet = build_packet(
            &event,
            &identity,
            build_dispatch_id(fixed_now(), 1),
            fixed_now(),
        );

        assert_eq!(packet.schema_version, "dispatch.v1");
        assert_eq!(packet.mode, "trial");
        assert_eq!(
            packet.current_truth,
            "HBAG-SELL-PACK changed (abc1234 → def5678)"
        );
        assert_eq!(
            packet.next_scope_now,
            "Investigate channel-strategy delta for HBAG"
        );
        assert_eq!(packet.priority, Priority::P2);
        assert_eq!(packet.queue_state, QueueState::Enqueued);
        assert_eq!(
            packet.location_anchors,
            vec!["docs/strategy/HBAG/sell-pack.user.md"]
        );
        assert!(!packet.evidence_refs.is_empty());
        assert_eq!(packet.created_at, fixed_now());
    }

    #[test]
    fn test_long_hashes_truncated_in_current_truth() {
        let mut event = t1_event();
        event.before_sha = Some("0123456789abcdef".to_string());
        event.after_sha = "fedcba9876543210".to_string();
        let identity = derive_identity(&event);
        let packet = build_packet(
            &event,
            &identity,
            build_dispatch_id(fixed_now(), 1),
            fixed_now(),
        );
        assert_eq!(
            packet.current_truth,
            "HBAG-SELL-PACK changed (0123456 → fedcba9)"
        );
    }
}
