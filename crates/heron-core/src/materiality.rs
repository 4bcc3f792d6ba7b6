//! Materiality classification: substantive vs. cosmetic deltas.
//!
//! Precedence order:
//! 1. An explicit materiality flag on the event always wins.
//! 2. If both truth fingerprints are present and non-blank, materiality is
//!    plain string inequality.
//! 3. Metadata-only heuristic over the changed-section headings.

use crate::types::ArtifactDeltaEvent;
use crate::vocab;

/// Classify a delta as material (substantive) or not (cosmetic).
///
/// An empty section list is material *at this layer*: the admission gate has
/// already rejected events with no section evidence, so an empty list here
/// only occurs for callers using the classifier standalone, and the
/// conservative default is to treat the change as substantive.
pub fn is_material(event: &ArtifactDeltaEvent) -> bool {
    if let Some(explicit) = event.material {
        return explicit;
    }

    if let (Some(before), Some(after)) = (
        non_blank(event.truth_fingerprint_before.as_deref()),
        non_blank(event.truth_fingerprint_after.as_deref()),
    ) {
        return before != after;
    }

    heuristic_materiality(event.sections())
}

/// Metadata-only fallback: every heading must match the fixed pattern table
/// for the delta to be non-material; any unmatched heading makes it
/// material.
fn heuristic_materiality(sections: &[String]) -> bool {
    if sections.is_empty() {
        return true;
    }
    !sections
        .iter()
        .all(|heading| vocab::is_metadata_only_heading(heading))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_sections(sections: &[&str]) -> ArtifactDeltaEvent {
        ArtifactDeltaEvent {
            changed_sections: Some(sections.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_flag_wins() {
        let mut event = event_with_sections(&["Last Updated"]);
        event.material = Some(true);
        assert!(is_material(&event));

        let mut event = event_with_sections(&["Target Customer"]);
        event.material = Some(false);
        assert!(!is_material(&event));
    }

    #[test]
    fn test_truth_fingerprints_compared_when_both_present() {
        let mut event = event_with_sections(&["Last Updated"]);
        event.truth_fingerprint_before = Some("tf-aaa".to_string());
        event.truth_fingerprint_after = Some("tf-bbb".to_string());
        assert!(is_material(&event));

        event.truth_fingerprint_after = Some("tf-aaa".to_string());
        assert!(!is_material(&event));
    }

    #[test]
    fn test_blank_fingerprint_falls_through_to_heuristic() {
        let mut event = event_with_sections(&["Target Customer"]);
        event.truth_fingerprint_before = Some("  ".to_string());
        event.truth_fingerprint_after = Some("tf-bbb".to_string());
        assert!(is_material(&event));
    }

    #[test]
    fn test_metadata_only_headings_are_non_material() {
        assert!(!is_material(&event_with_sections(&[
            "Last Updated",
            "Timestamp",
        ])));
    }

    #[test]
    fn test_any_substantive_heading_is_material() {
        assert!(is_material(&event_with_sections(&[
            "Last Updated",
            "Pricing Policy",
        ])));
    }

    #[test]
    fn test_empty_section_list_defaults_to_material() {
        assert!(is_material(&ArtifactDeltaEvent::default()));
        assert!(is_material(&event_with_sections(&[])));
    }
}
