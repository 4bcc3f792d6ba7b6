//! Pure validator for `dispatch.v2` packets.
//!
//! Findings are returned as data so callers can surface every problem at
//! once. Quality warnings are advisory and never block: an auto-generated
//! intended outcome is valid, but must be excluded from operator-authored
//! quality metrics.

use crate::types::{DispatchPacketV2, SCHEMA_V2};

/// Allowed intended-outcome types.
pub const ALLOWED_OUTCOME_KINDS: &[&str] = &["measurable", "operational"];
/// Allowed intended-outcome provenance values.
pub const ALLOWED_OUTCOME_SOURCES: &[&str] = &["operator", "auto"];

/// Validation findings for one v2 packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct V2ValidationReport {
    /// Blocking problems; empty means the packet is valid.
    pub errors: Vec<String>,
    /// Non-blocking advisories (auto-sourced outcome).
    pub quality_warnings: Vec<String>,
}

impl V2ValidationReport {
    /// True when no blocking errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a v2-shaped packet.
///
/// Checks, in order: the literal schema tag, a non-blank `why`, and a
/// present, well-formed intended outcome (type, statement, provenance).
pub fn validate_v2_packet(packet: &DispatchPacketV2) -> V2ValidationReport {
    let mut report = V2ValidationReport::default();

    if packet.base.schema_version != SCHEMA_V2 {
        report.errors.push(format!(
            "schema_version must be \"{}\", got \"{}\"",
            SCHEMA_V2, packet.base.schema_version
        ));
    }

    if packet.why.trim().is_empty() {
        report
            .errors
            .push("why must be a non-blank string".to_string());
    }

    match &packet.intended_outcome {
        None => {
            report
                .errors
                .push("intended_outcome is required for dispatch.v2 packets".to_string());
        }
        Some(outcome) => {
            if !ALLOWED_OUTCOME_KINDS.contains(&outcome.kind.as_str()) {
                report.errors.push(format!(
                    "intended_outcome.type \"{}\" is not one of {:?}",
                    outcome.kind, ALLOWED_OUTCOME_KINDS
                ));
            }
            if outcome.statement.trim().is_empty() {
                report
                    .errors
                    .push("intended_outcome.statement must be non-blank".to_string());
            }
            if !ALLOWED_OUTCOME_SOURCES.contains(&outcome.source.as_str()) {
                report.errors.push(format!(
                    "intended_outcome.source \"{}\" is not one of {:?}",
                    outcome.source, ALLOWED_OUTCOME_SOURCES
                ));
            } else if outcome.source == "auto" {
                report.quality_warnings.push(
                    "intended_outcome.source is \"auto\"; exclude from operator-authored \
                     quality metrics"
                        .to_string(),
                );
            }
        }
    }

    report
}
