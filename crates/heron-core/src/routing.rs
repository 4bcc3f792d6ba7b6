//! Dispatch routing adapter.
//!
//! Pure function: validates a v1 or v2 packet for completeness and produces
//! a typed invocation payload for the downstream workflow. It never invokes
//! anything itself (queue-with-confirmation policy): the payload is a data
//! structure describing what to invoke.
//!
//! v1 compatibility: `current_truth` maps into the payload `why` with
//! provenance `compat-v1`, so consumers can detect migration status.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::types::{
    DeliverableFamily, DispatchPacket, DispatchPacketV2, DispatchStatus, IntendedOutcome,
    RecommendedRoute, WhySource, SCHEMA_V1, SCHEMA_V2,
};

/// Machine-readable routing failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingErrorCode {
    InvalidSchemaVersion,
    InvalidMode,
    ReservedStatus,
    NonRoutableStatus,
    RouteStatusMismatch,
    MissingEvidenceRefs,
    MissingAreaAnchor,
    MissingLocationAnchors,
}

/// Provenance of the payload `why` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadWhySource {
    /// Operator-authored (v2).
    #[serde(rename = "operator")]
    Operator,
    /// Auto-generated fallback (v2); excluded from quality metrics.
    #[serde(rename = "auto")]
    Auto,
    /// Derived from a v1 packet's `current_truth` (lossy approximation).
    #[serde(rename = "compat-v1")]
    CompatV1,
}

/// Invocation payload handed to the downstream workflow runner.
///
/// `provisional_deliverable_family` is populated for the fact-find path,
/// where the intake contract requires it; the briefing path needs only the
/// area anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationPayload {
    pub skill: RecommendedRoute,
    pub dispatch_id: String,
    pub business: String,
    pub area_anchor: String,
    pub location_anchors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional_deliverable_family: Option<DeliverableFamily>,
    pub evidence_refs: Vec<String>,
    pub dispatch_created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_source: Option<PayloadWhySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_outcome: Option<IntendedOutcome>,
}

/// Successful routing decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSuccess {
    pub route: RecommendedRoute,
    pub payload: InvocationPayload,
}

/// Routing failure with an actionable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteError {
    pub code: RoutingErrorCode,
    pub error: String,
    pub dispatch_id: String,
}

impl RouteError {
    fn new(code: RoutingErrorCode, dispatch_id: &str, error: String) -> Self {
        Self {
            code,
            error,
            dispatch_id: dispatch_id.to_string(),
        }
    }
}

/// Route a v1 dispatch packet.
pub fn route_dispatch(packet: &DispatchPacket) -> Result<RouteSuccess, RouteError> {
    let compat_why = if packet.current_truth.trim().is_empty() {
        None
    } else {
        Some(packet.current_truth.clone())
    };
    route_inner(
        packet,
        SCHEMA_V1,
        compat_why,
        Some(PayloadWhySource::CompatV1),
        None,
    )
}

/// Route a v2 dispatch packet, propagating `why` and the intended outcome
/// into the payload.
pub fn route_dispatch_v2(packet: &DispatchPacketV2) -> Result<RouteSuccess, RouteError> {
    let why_source = match packet.why_source {
        WhySource::Operator => PayloadWhySource::Operator,
        WhySource::Auto => PayloadWhySource::Auto,
    };
    route_inner(
        &packet.base,
        SCHEMA_V2,
        Some(packet.why.clone()),
        Some(why_source),
        packet.intended_outcome.clone(),
    )
}

fn route_inner(
    packet: &DispatchPacket,
    expected_schema: &str,
    why: Option<String>,
    why_source: Option<PayloadWhySource>,
    intended_outcome: Option<IntendedOutcome>,
) -> Result<RouteSuccess, RouteError> {
    let dispatch_id = packet.dispatch_id.as_str();

    if packet.schema_version != expected_schema {
        return Err(RouteError::new(
            RoutingErrorCode::InvalidSchemaVersion,
            dispatch_id,
            format!(
                "invalid schema_version \"{}\": expected \"{expected_schema}\"; ensure the \
                 packet was produced by the trial orchestrator and has not been mutated",
                packet.schema_version
            ),
        ));
    }

    if packet.mode != "trial" && packet.mode != "live" {
        return Err(RouteError::new(
            RoutingErrorCode::InvalidMode,
            dispatch_id,
            format!(
                "packet mode \"{}\" is not permitted: only \"trial\" and \"live\" packets are \
                 routable",
                packet.mode
            ),
        ));
    }

    let canonical_route = match packet.status {
        DispatchStatus::AutoExecuted => {
            return Err(RouteError::new(
                RoutingErrorCode::ReservedStatus,
                dispatch_id,
                format!(
                    "dispatch {dispatch_id} has status \"auto_executed\", which is reserved \
                     under queue-with-confirmation and must never reach routing"
                ),
            ));
        }
        DispatchStatus::LoggedNoAction => {
            return Err(RouteError::new(
                RoutingErrorCode::NonRoutableStatus,
                dispatch_id,
                format!(
                    "dispatch {dispatch_id} has status \"logged_no_action\", a terminal \
                     conservative no-op that must not be forwarded downstream"
                ),
            ));
        }
        DispatchStatus::FactFindReady => RecommendedRoute::FactFind,
        DispatchStatus::BriefingReady => RecommendedRoute::Briefing,
    };
    if canonical_route != packet.recommended_route {
        return Err(RouteError::new(
            RoutingErrorCode::RouteStatusMismatch,
            dispatch_id,
            format!(
                "dispatch {dispatch_id} has mismatched status/route pair: status \"{}\" \
                 requires recommended_route \"{canonical_route}\", but the packet carries \
                 \"{}\"",
                packet.status, packet.recommended_route
            ),
        ));
    }

    if packet.evidence_refs.is_empty() {
        return Err(RouteError::new(
            RoutingErrorCode::MissingEvidenceRefs,
            dispatch_id,
            format!(
                "dispatch {dispatch_id} is missing evidence_refs (must have >=1 item) tracing \
                 the origin artifact"
            ),
        ));
    }

    if packet.area_anchor.trim().is_empty() {
        return Err(RouteError::new(
            RoutingErrorCode::MissingAreaAnchor,
            dispatch_id,
            format!(
                "dispatch {dispatch_id} has an empty area_anchor; both downstream workflows \
                 require a concrete area anchor"
            ),
        ));
    }

    // The fact-find intake contract additionally requires location anchors
    // and a deliverable family.
    let deliverable_family = match canonical_route {
        RecommendedRoute::FactFind => {
            if packet.location_anchors.is_empty() {
                return Err(RouteError::new(
                    RoutingErrorCode::MissingLocationAnchors,
                    dispatch_id,
                    format!(
                        "dispatch {dispatch_id} is missing location_anchors (must have >=1 \
                         item) for the fact-find path; verify the source event had a \
                         non-empty path"
                    ),
                ));
            }
            Some(packet.provisional_deliverable_family)
        }
        RecommendedRoute::Briefing => None,
    };

    Ok(RouteSuccess {
        route: canonical_route,
        payload: InvocationPayload {
            skill: canonical_route,
            dispatch_id: packet.dispatch_id.clone(),
            business: packet.business.clone(),
            area_anchor: packet.area_anchor.clone(),
            location_anchors: packet.location_anchors.clone(),
            provisional_deliverable_family: deliverable_family,
            evidence_refs: packet.evidence_refs.clone(),
            dispatch_created_at: packet.created_at,
            why,
            why_source,
            intended_outcome,
        },
    })
}
