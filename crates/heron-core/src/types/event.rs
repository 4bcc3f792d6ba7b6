//! The inbound delta event type.

use serde::{Deserialize, Serialize};

/// One observed change to one standing artifact.
///
/// Events are immutable once received; the core never mutates them. Most
/// fields are optional: an upstream watcher may supply precomputed
/// clustering fields, or leave them absent for local derivation
/// (supplied-value-wins, see [`crate::clustering`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDeltaEvent {
    /// Stable artifact identifier, e.g. `HBAG-SELL-PACK`.
    pub artifact_id: String,
    /// Owning business code.
    pub business: String,
    /// Previous content hash. `None` means first registration: a brand-new
    /// artifact cannot have a delta yet.
    pub before_sha: Option<String>,
    /// New content hash.
    pub after_sha: String,
    /// Repository path of the artifact file.
    pub path: String,
    /// Optional domain tag (`MARKET`, `SELL`, ...).
    pub domain: Option<String>,
    /// Headings of the sections that changed. Required evidence of *what*
    /// changed; an absent or empty list is a conservative no-op.
    pub changed_sections: Option<Vec<String>>,
    /// Id of the process that produced the edit, when known.
    pub produced_by: Option<String>,
    /// Precomputed semantic-diff hash from an upstream differ.
    pub semantic_diff_sha: Option<String>,
    /// Upstream-supplied root-event id.
    pub root_event_id: Option<String>,
    /// Upstream-supplied anchor key.
    pub anchor_key: Option<String>,
    /// Upstream-supplied cluster key.
    pub cluster_key: Option<String>,
    /// Upstream-supplied cluster fingerprint.
    pub cluster_fingerprint: Option<String>,
    /// Derivation hops separating this delta from its root change.
    pub lineage_depth: Option<u32>,
    /// Explicit evidence references; defaults to `[path]` when absent.
    pub evidence_refs: Option<Vec<String>>,
    /// Truth fingerprint of the artifact before the edit.
    pub truth_fingerprint_before: Option<String>,
    /// Truth fingerprint of the artifact after the edit.
    pub truth_fingerprint_after: Option<String>,
    /// Explicit materiality flag; always wins over local classification.
    pub material: Option<bool>,
}

impl ArtifactDeltaEvent {
    /// Changed-section headings, empty slice when none were supplied.
    pub fn sections(&self) -> &[String] {
        self.changed_sections.as_deref().unwrap_or(&[])
    }

    /// Evidence references, falling back to the event's file path.
    pub fn effective_evidence_refs(&self) -> Vec<String> {
        match &self.evidence_refs {
            Some(refs) if !refs.is_empty() => refs.clone(),
            _ => vec![self.path.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_to_none() {
        let event: ArtifactDeltaEvent = serde_json::from_str(
            r#"{
                "artifact_id": "ACME-MARKET",
                "business": "acme",
                "before_sha": "aaa1111",
                "after_sha": "bbb2222",
                "path": "market.md"
            }"#,
        )
        .unwrap();
        assert_eq!(event.domain, None);
        assert_eq!(event.changed_sections, None);
        assert_eq!(event.lineage_depth, None);
        assert_eq!(event.material, None);
    }

    #[test]
    fn test_evidence_refs_fall_back_to_path() {
        let event = ArtifactDeltaEvent {
            path: "docs/market.md".to_string(),
            ..Default::default()
        };
        assert_eq!(event.effective_evidence_refs(), vec!["docs/market.md"]);

        let explicit = ArtifactDeltaEvent {
            evidence_refs: Some(vec!["a.md".to_string(), "b.md".to_string()]),
            ..Default::default()
        };
        assert_eq!(explicit.effective_evidence_refs().len(), 2);
    }

    #[test]
    fn test_empty_evidence_list_falls_back_to_path() {
        let event = ArtifactDeltaEvent {
            path: "docs/market.md".to_string(),
            evidence_refs: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(event.effective_evidence_refs(), vec!["docs/market.md"]);
    }
}
