//! Lineage and anti-self-trigger limiters.
//!
//! Both guards exist to stop runaway feedback: deep derivation chains and
//! the pipeline's own downstream emitters re-triggering it on cosmetic
//! re-renders.

use std::collections::HashSet;

use crate::suppression::SuppressionReason;
use crate::vocab;

/// Default cap on derivation hops from the root change.
pub const DEFAULT_LINEAGE_DEPTH_CAP: u32 = 2;

/// Lineage cap: suppress when depth exceeds the cap, unless the root event
/// is explicitly allowlisted.
pub fn lineage_gate(
    lineage_depth: u32,
    cap: u32,
    root_event_id: &str,
    root_overrides: &HashSet<String>,
) -> Option<SuppressionReason> {
    if lineage_depth > cap && !root_overrides.contains(root_event_id) {
        return Some(SuppressionReason::LineageDepthCapExceeded);
    }
    None
}

/// Anti-self-trigger: a non-material delta produced by one of the known
/// automated emitters is a feedback echo, not new work.
pub fn self_trigger_gate(produced_by: Option<&str>, material: bool) -> Option<SuppressionReason> {
    match produced_by {
        Some(process) if vocab::is_self_trigger_process(process) && !material => {
            Some(SuppressionReason::AntiSelfTriggerNonMaterial)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_within_cap_passes() {
        let overrides = HashSet::new();
        assert_eq!(lineage_gate(0, 2, "root-1", &overrides), None);
        assert_eq!(lineage_gate(2, 2, "root-1", &overrides), None);
    }

    #[test]
    fn test_depth_over_cap_suppressed() {
        let overrides = HashSet::new();
        assert_eq!(
            lineage_gate(3, 2, "root-1", &overrides),
            Some(SuppressionReason::LineageDepthCapExceeded)
        );
    }

    #[test]
    fn test_override_allowlist_bypasses_cap() {
        let overrides: HashSet<String> = ["root-1".to_string()].into_iter().collect();
        assert_eq!(lineage_gate(9, 2, "root-1", &overrides), None);
        assert_eq!(
            lineage_gate(9, 2, "root-2", &overrides),
            Some(SuppressionReason::LineageDepthCapExceeded)
        );
    }

    #[test]
    fn test_self_trigger_blocks_only_non_material() {
        assert_eq!(
            self_trigger_gate(Some("projection-compiler"), false),
            Some(SuppressionReason::AntiSelfTriggerNonMaterial)
        );
        // Material deltas from the same process still pass.
        assert_eq!(self_trigger_gate(Some("projection-compiler"), true), None);
    }

    #[test]
    fn test_unknown_process_passes() {
        assert_eq!(self_trigger_gate(Some("operator-edit"), false), None);
        assert_eq!(self_trigger_gate(None, false), None);
    }
}
