//! Clustering and fingerprint derivation.
//!
//! Groups related deltas under a shared cluster identity. Every field
//! follows the same precedence rule: a value explicitly supplied on the
//! event wins over the locally derived one. The [`coalesce`] helper keeps
//! that rule in one auditable place.

use crate::keys::{normalize_artifact_id, slugify, stable_fingerprint, NULL_SHA_PLACEHOLDER};
use crate::types::ArtifactDeltaEvent;
use crate::vocab;

/// Derived cluster identity for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterIdentity {
    pub root_event_id: String,
    pub area_anchor: String,
    pub anchor_key: String,
    pub cluster_key: String,
    pub semantic_diff_sha: String,
    pub cluster_fingerprint: String,
    pub lineage_depth: u32,
    pub evidence_refs: Vec<String>,
}

/// Supplied-value-wins: use the event's value when present and non-blank,
/// otherwise derive one locally.
fn coalesce(supplied: Option<&str>, derive: impl FnOnce() -> String) -> String {
    match supplied.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => derive(),
    }
}

/// Derive the full cluster identity for an event.
pub fn derive_identity(event: &ArtifactDeltaEvent) -> ClusterIdentity {
    let evidence_refs = event.effective_evidence_refs();

    let root_event_id = coalesce(event.root_event_id.as_deref(), || {
        format!(
            "{}:{}",
            normalize_artifact_id(&event.artifact_id),
            event.after_sha
        )
    });

    let area_anchor = derive_area_anchor(event);

    let anchor_key = match event.anchor_key.as_deref().map(slugify) {
        Some(slug) if !slug.is_empty() => slug,
        _ => slugify(&area_anchor),
    };

    let cluster_key = coalesce(event.cluster_key.as_deref(), || {
        format!(
            "{}:{}:{}:{}",
            event.business.to_lowercase(),
            event
                .domain
                .as_deref()
                .map(|d| d.to_lowercase())
                .unwrap_or_else(|| "unknown".to_string()),
            anchor_key,
            root_event_id
        )
    });

    let semantic_diff_sha = coalesce(event.semantic_diff_sha.as_deref(), || {
        derive_semantic_diff_sha(event)
    });

    let cluster_fingerprint = coalesce(event.cluster_fingerprint.as_deref(), || {
        stable_fingerprint(&[
            &root_event_id,
            &anchor_key,
            &evidence_refs.join(","),
            &semantic_diff_sha,
        ])
    });

    ClusterIdentity {
        root_event_id,
        area_anchor,
        anchor_key,
        cluster_key,
        semantic_diff_sha,
        cluster_fingerprint,
        lineage_depth: event.lineage_depth.unwrap_or(0),
        evidence_refs,
    }
}

/// Area anchor: fixed domain table first, artifact-id fallback second.
///
/// The fallback lower-cases the artifact id, converts underscores to
/// hyphens, and strips the leading business-code token.
fn derive_area_anchor(event: &ArtifactDeltaEvent) -> String {
    if let Some(area) = event
        .domain
        .as_deref()
        .and_then(vocab::area_anchor_for_domain)
    {
        return area.to_string();
    }

    let lowered = event.artifact_id.to_lowercase().replace('_', "-");
    let business_prefix = format!("{}-", event.business.to_lowercase());
    match lowered.strip_prefix(&business_prefix) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => lowered,
    }
}

/// Fallback semantic-diff hash: stable fingerprint over the sorted,
/// slug-normalized changed-section list plus the artifact id and both
/// content hashes.
fn derive_semantic_diff_sha(event: &ArtifactDeltaEvent) -> String {
    let mut slugs: Vec<String> = event.sections().iter().map(|s| slugify(s)).collect();
    slugs.sort();

    let mut parts: Vec<&str> = vec![
        &event.artifact_id,
        event.before_sha.as_deref().unwrap_or(NULL_SHA_PLACEHOLDER),
        &event.after_sha,
    ];
    parts.extend(slugs.iter().map(String::as_str));
    stable_fingerprint(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sell_event() -> ArtifactDeltaEvent {
        ArtifactDeltaEvent {
            artifact_id: "HEAD-SELL-PACK".to_string(),
            business: "HEAD".to_string(),
            before_sha: Some("abc0001".to_string()),
            after_sha: "def0002".to_string(),
            path: "docs/strategy/HEAD/sell-pack.user.md".to_string(),
            domain: Some("SELL".to_string()),
            changed_sections: Some(vec!["channel strategy".to_string(), "pricing".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_derived_identity_shapes() {
        let identity = derive_identity(&sell_event());
        assert_eq!(identity.root_event_id, "HEAD-SELL-PACK:def0002");
        assert_eq!(identity.area_anchor, "channel-strategy");
        assert_eq!(identity.anchor_key, "channel-strategy");
        assert_eq!(
            identity.cluster_key,
            "head:sell:channel-strategy:HEAD-SELL-PACK:def0002"
        );
        assert_eq!(identity.lineage_depth, 0);
        assert_eq!(
            identity.evidence_refs,
            vec!["docs/strategy/HEAD/sell-pack.user.md"]
        );
    }

    #[test]
    fn test_supplied_values_win() {
        let mut event = sell_event();
        event.root_event_id = Some("ROOT-77".to_string());
        event.anchor_key = Some("Custom Anchor".to_string());
        event.cluster_key = Some("custom:key".to_string());
        event.cluster_fingerprint = Some("fp-supplied".to_string());
        event.semantic_diff_sha = Some("diff-supplied".to_string());
        event.lineage_depth = Some(3);

        let identity = derive_identity(&event);
        assert_eq!(identity.root_event_id, "ROOT-77");
        // Supplied anchor keys are still slug-normalized.
        assert_eq!(identity.anchor_key, "custom-anchor");
        assert_eq!(identity.cluster_key, "custom:key");
        assert_eq!(identity.cluster_fingerprint, "fp-supplied");
        assert_eq!(identity.semantic_diff_sha, "diff-supplied");
        assert_eq!(identity.lineage_depth, 3);
    }

    #[test]
    fn test_blank_supplied_values_fall_back() {
        let mut event = sell_event();
        event.root_event_id = Some("   ".to_string());
        let identity = derive_identity(&event);
        assert_eq!(identity.root_event_id, "HEAD-SELL-PACK:def0002");
    }

    #[test]
    fn test_area_anchor_falls_back_to_artifact_id() {
        let mut event = sell_event();
        event.domain = None;
        let identity = derive_identity(&event);
        assert_eq!(identity.area_anchor, "sell-pack");
    }

    #[test]
    fn test_area_anchor_fallback_handles_underscores() {
        let event = ArtifactDeltaEvent {
            artifact_id: "ACME-PRICING_DECISIONS".to_string(),
            business: "acme".to_string(),
            after_sha: "bbb".to_string(),
            ..Default::default()
        };
        let identity = derive_identity(&event);
        assert_eq!(identity.area_anchor, "pricing-decisions");
    }

    #[test]
    fn test_missing_domain_uses_unknown_in_cluster_key() {
        let mut event = sell_event();
        event.domain = None;
        let identity = derive_identity(&event);
        assert!(identity.cluster_key.starts_with("head:unknown:"));
    }

    #[test]
    fn test_semantic_diff_sha_ignores_section_order() {
        let mut reordered = sell_event();
        reordered.changed_sections =
            Some(vec!["pricing".to_string(), "channel strategy".to_string()]);
        assert_eq!(
            derive_identity(&sell_event()).semantic_diff_sha,
            derive_identity(&reordered).semantic_diff_sha
        );
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(
            derive_identity(&sell_event()).cluster_fingerprint,
            derive_identity(&sell_event()).cluster_fingerprint
        );
    }
}
