//! Key normalization and the stable fingerprint primitive.
//!
//! Every identifier that participates in dedupe, clustering, or cooldown
//! lookups passes through one of these helpers so that key construction
//! stays auditable in a single place.

use sha2::{Digest, Sha256};

use crate::types::ArtifactDeltaEvent;

/// Placeholder used in dedupe keys when an event has no previous hash.
pub const NULL_SHA_PLACEHOLDER: &str = "null";

/// Normalize an artifact id for registry and override lookups.
///
/// Registry snapshots are keyed by this form: trimmed, upper-cased.
pub fn normalize_artifact_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize a free-form value to a lowercase slug of `[a-z0-9-]`.
///
/// Runs of any other character collapse to a single hyphen; leading and
/// trailing hyphens are dropped.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Build the dedupe key for an event.
///
/// Format: `"<artifact_id>:<before_sha|null>:<after_sha>"`. The literal
/// `null` placeholder keeps first-registration keys distinct from keys with
/// an empty-string hash.
pub fn dedupe_key(event: &ArtifactDeltaEvent) -> String {
    format!(
        "{}:{}:{}",
        event.artifact_id,
        event.before_sha.as_deref().unwrap_or(NULL_SHA_PLACEHOLDER),
        event.after_sha
    )
}

/// Truncate a content hash for human-readable narratives.
pub fn short_sha(sha: &str) -> String {
    sha.chars().take(7).collect()
}

/// Stable fingerprint primitive: sha-256 over newline-joined parts, hex.
///
/// Shared by the semantic-diff fallback hash and the cluster fingerprint.
/// The newline join keeps `["ab", "c"]` and `["a", "bc"]` distinct.
pub fn stable_fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("\n").as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event() -> ArtifactDeltaEvent {
        ArtifactDeltaEvent {
            artifact_id: "HBAG-SELL-PACK".to_string(),
            business: "HBAG".to_string(),
            before_sha: Some("abc1234".to_string()),
            after_sha: "def5678".to_string(),
            path: "docs/strategy/HBAG/sell-pack.user.md".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dedupe_key_stable() {
        assert_eq!(dedupe_key(&make_event()), "HBAG-SELL-PACK:abc1234:def5678");
    }

    #[test]
    fn test_dedupe_key_null_placeholder() {
        let mut event = make_event();
        event.before_sha = None;
        assert_eq!(dedupe_key(&event), "HBAG-SELL-PACK:null:def5678");
    }

    #[test]
    fn test_normalize_artifact_id() {
        assert_eq!(normalize_artifact_id("  hbag-sell-pack "), "HBAG-SELL-PACK");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Channel Strategy"), "channel-strategy");
        assert_eq!(slugify("  ICP / Definition!  "), "icp-definition");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("abc1234def"), "abc1234");
        assert_eq!(short_sha("ab"), "ab");
    }

    #[test]
    fn test_stable_fingerprint_is_hex_and_deterministic() {
        let a = stable_fingerprint(&["root", "anchor"]);
        let b = stable_fingerprint(&["root", "anchor"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stable_fingerprint_separator_matters() {
        assert_ne!(
            stable_fingerprint(&["ab", "c"]),
            stable_fingerprint(&["a", "bc"])
        );
    }
}
