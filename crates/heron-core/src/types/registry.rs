//! Standing artifact registry snapshot (external collaborator, read-only).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::keys::normalize_artifact_id;

/// Classification of a registered artifact.
///
/// The two `source_*` classes are "source-primary": only they may trigger
/// work when a cutover phase enforces source-primary admission. The four
/// derived/observational classes enjoy projection immunity.
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
pub enum ArtifactClass {
    /// Operator-maintained working document (interview logs, backlogs, ...).
    SourceProcess,
    /// Operator-maintained reference document (KPI packs, policies, ...).
    SourceReference,
    /// Derived rollup/summary view.
    ProjectionSummary,
    /// Runtime state emitted by the pipeline itself.
    SystemTelemetry,
    /// Output of an executed downstream action.
    ExecutionOutput,
    /// Retrospective/review artifact.
    Reflection,
    /// Anything the registry could not classify.
    Other,
}

impl ArtifactClass {
    /// Source-primary classes may trigger work under strict phases.
    pub fn is_source_primary(&self) -> bool {
        matches!(self, Self::SourceProcess | Self::SourceReference)
    }

    /// Derived/observational classes are suppressed by projection immunity.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Self::ProjectionSummary
                | Self::SystemTelemetry
                | Self::ExecutionOutput
                | Self::Reflection
        )
    }
}

/// Per-artifact trigger policy.
///
/// Anything not explicitly eligible or never is implicitly
/// manual-override-only, which is also the default for registry rows that
/// omit the field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Artifact deltas may trigger work on their own.
    Eligible,
    /// Only a manual override admits deltas for this artifact.
    #[default]
    ManualOverrideOnly,
    /// Never admitted, override or not.
    Never,
}

/// One registry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Artifact id as registered (normalized on snapshot construction).
    pub artifact_id: String,
    /// Registered file path, when known.
    pub path: Option<String>,
    /// Whether the artifact is currently tracked.
    pub active: bool,
    /// Artifact classification.
    pub artifact_class: ArtifactClass,
    /// Trigger policy; defaults to manual-override-only when absent.
    #[serde(default)]
    pub trigger_policy: TriggerPolicy,
}

/// Serialized registry document shape (`{"artifacts": [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub artifacts: Vec<RegistryEntry>,
}

/// Read-only registry lookup keyed by normalized artifact id.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: HashMap<String, RegistryEntry>,
}

impl RegistrySnapshot {
    /// Build a snapshot from registry rows. Later rows win on id collision.
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            map.insert(normalize_artifact_id(&entry.artifact_id), entry);
        }
        Self { entries: map }
    }

    /// Build a snapshot from a parsed registry document.
    pub fn from_document(document: RegistryDocument) -> Self {
        Self::from_entries(document.artifacts)
    }

    /// Look up an artifact by id (normalized before lookup).
    pub fn lookup(&self, artifact_id: &str) -> Option<&RegistryEntry> {
        self.entries.get(&normalize_artifact_id(artifact_id))
    }

    /// Number of registered artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, class: ArtifactClass, policy: TriggerPolicy) -> RegistryEntry {
        RegistryEntry {
            artifact_id: id.to_string(),
            path: None,
            active: true,
            artifact_class: class,
            trigger_policy: policy,
        }
    }

    #[test]
    fn test_lookup_normalizes_artifact_id() {
        let snapshot = RegistrySnapshot::from_entries([entry(
            "hbag-sell-pack",
            ArtifactClass::SourceProcess,
            TriggerPolicy::Eligible,
        )]);
        assert!(snapshot.lookup("HBAG-SELL-PACK").is_some());
        assert!(snapshot.lookup("  hbag-sell-pack ").is_some());
        assert!(snapshot.lookup("OTHER").is_none());
    }

    #[test]
    fn test_source_primary_classes() {
        assert!(ArtifactClass::SourceProcess.is_source_primary());
        assert!(ArtifactClass::SourceReference.is_source_primary());
        assert!(!ArtifactClass::ProjectionSummary.is_source_primary());
        assert!(!ArtifactClass::Other.is_source_primary());
    }

    #[test]
    fn test_derived_classes() {
        for class in [
            ArtifactClass::ProjectionSummary,
            ArtifactClass::SystemTelemetry,
            ArtifactClass::ExecutionOutput,
            ArtifactClass::Reflection,
        ] {
            assert!(class.is_derived());
        }
        assert!(!ArtifactClass::SourceProcess.is_derived());
        assert!(!ArtifactClass::Other.is_derived());
    }

    #[test]
    fn test_trigger_policy_defaults_to_manual_override_only() {
        let row: RegistryEntry = serde_json::from_str(
            r#"{
                "artifact_id": "HBAG-KPI-PACK",
                "path": null,
                "active": true,
                "artifact_class": "source_reference"
            }"#,
        )
        .unwrap();
        assert_eq!(row.trigger_policy, TriggerPolicy::ManualOverrideOnly);
    }

    #[test]
    fn test_registry_document_round_trip() {
        let doc: RegistryDocument = serde_json::from_str(
            r#"{"artifacts": [{
                "artifact_id": "HEAD-SELL-PACK",
                "path": "docs/strategy/HEAD/sell-pack.user.md",
                "active": true,
                "artifact_class": "source_process",
                "trigger_policy": "eligible"
            }]}"#,
        )
        .unwrap();
        let snapshot = RegistrySnapshot::from_document(doc);
        let row = snapshot.lookup("HEAD-SELL-PACK").unwrap();
        assert_eq!(row.artifact_class, ArtifactClass::SourceProcess);
        assert_eq!(row.trigger_policy, TriggerPolicy::Eligible);
    }
}
