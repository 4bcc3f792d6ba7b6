//! Versioned vocabulary tables used by the admission gates.
//!
//! Keeping the keyword and pattern lists here, rather than scattered through
//! the gate code, lets them be reviewed and unit-tested as one surface.

use once_cell::sync::Lazy;
use regex::Regex;

/// Vocabulary revision tag. Bump when any table below changes.
pub const VOCAB_VERSION: &str = "2026.02";

/// Tier-1 semantic keywords: customer, segment, positioning, pricing, and
/// channel-strategy vocabulary. A case-insensitive substring match against a
/// changed-section heading routes the delta to the fact-finding workflow.
pub const T1_SEMANTIC_KEYWORDS: &[&str] = &[
    "icp",
    "ideal customer",
    "target customer",
    "customer profile",
    "segment",
    "positioning",
    "value proposition",
    "pricing",
    "price point",
    "channel strategy",
    "channel mix",
    "go-to-market",
];

/// Heading patterns that mark a section change as metadata-only:
/// timestamps, frontmatter, formatting, whitespace, and index maintenance.
pub static METADATA_ONLY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^last[ _-]?updated\b",
        r"(?i)^updated([ _-]at)?$",
        r"(?i)^timestamp\b",
        r"(?i)^generated([ _-]at)?$",
        r"(?i)^frontmatter\b",
        r"(?i)^metadata$",
        r"(?i)^format(ting)?$",
        r"(?i)^whitespace$",
        r"(?i)^index$",
        r"(?i)^table of contents$",
        r"(?i)^toc$",
        r"(?i)^revision history$",
        r"(?i)^changelog$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("metadata-only pattern must compile"))
    .collect()
});

/// Artifact-id suffix patterns denoting aggregate/rollup pack documents.
/// Applied to the normalized (upper-cased) artifact id.
pub static PACK_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"-(MARKET|SELL|PRODUCTS|LOGISTICS)-PACK$",
        r"-(MARKET|SELL|PRODUCTS|LOGISTICS)-AGGREGATE-PACK$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("pack id pattern must compile"))
    .collect()
});

/// File-path patterns denoting aggregate/rollup pack documents.
pub static PACK_PATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)/market-pack\.user\.md$",
        r"(?i)/sell-pack\.user\.md$",
        r"(?i)/(product-pack|products-aggregate-pack)\.user\.md$",
        r"(?i)/logistics-pack\.user\.md$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("pack path pattern must compile"))
    .collect()
});

/// Process ids whose own outputs must not re-trigger the pipeline on
/// cosmetic re-renders: the automated projection/reflection emitters plus
/// the two downstream workflows this engine dispatches into.
pub const SELF_TRIGGER_PROCESSES: &[&str] = &[
    "lp-do-fact-find",
    "lp-do-briefing",
    "projection-compiler",
    "reflection-compiler",
    "telemetry-rollup",
];

/// Fixed domain-tag to area-anchor mapping.
///
/// Returns `None` for unknown or absent domains; callers fall back to
/// deriving the anchor from the artifact id.
pub fn area_anchor_for_domain(domain: &str) -> Option<&'static str> {
    match domain.trim().to_uppercase().as_str() {
        "MARKET" => Some("market-intelligence"),
        "SELL" => Some("channel-strategy"),
        "PRODUCTS" => Some("product-portfolio"),
        "LOGISTICS" => Some("fulfillment-operations"),
        "STRATEGY" => Some("strategic-direction"),
        "LEGAL" => Some("legal-compliance"),
        "ASSESSMENT" => Some("business-assessment"),
        "BOS" => Some("business-os"),
        _ => None,
    }
}

/// Check whether a heading is metadata-only under the fixed pattern table.
pub fn is_metadata_only_heading(heading: &str) -> bool {
    let trimmed = heading.trim();
    METADATA_ONLY_PATTERNS.iter().any(|re| re.is_match(trimmed))
}

/// Check whether a heading carries tier-1 semantic vocabulary.
pub fn is_t1_heading(heading: &str) -> bool {
    let lowered = heading.to_lowercase();
    T1_SEMANTIC_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Pack detection: aggregate/rollup documents by id suffix or path shape.
pub fn is_pack_artifact(normalized_artifact_id: &str, path: &str) -> bool {
    PACK_ID_PATTERNS
        .iter()
        .any(|re| re.is_match(normalized_artifact_id))
        || PACK_PATH_PATTERNS.iter().any(|re| re.is_match(path))
}

/// Check whether a process id belongs to the self-triggering set.
pub fn is_self_trigger_process(process: &str) -> bool {
    let trimmed = process.trim();
    SELF_TRIGGER_PROCESSES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t1_contains_category_representatives() {
        assert!(T1_SEMANTIC_KEYWORDS.contains(&"icp"));
        assert!(T1_SEMANTIC_KEYWORDS.contains(&"pricing"));
        assert!(T1_SEMANTIC_KEYWORDS.contains(&"positioning"));
        assert!(T1_SEMANTIC_KEYWORDS.contains(&"channel strategy"));
    }

    #[test]
    fn test_t1_heading_match_is_case_insensitive() {
        assert!(is_t1_heading("ICP Analysis"));
        assert!(is_t1_heading("Channel Strategy Review"));
        assert!(is_t1_heading("Target Customer"));
        assert!(!is_t1_heading("Competitor Table"));
        assert!(!is_t1_heading("Distribution Notes"));
    }

    #[test]
    fn test_metadata_only_headings() {
        assert!(is_metadata_only_heading("Last Updated"));
        assert!(is_metadata_only_heading("last-updated"));
        assert!(is_metadata_only_heading("Timestamp"));
        assert!(is_metadata_only_heading("Frontmatter"));
        assert!(is_metadata_only_heading("  TOC  "));
        assert!(!is_metadata_only_heading("Pricing Policy"));
        // "Update" vocabulary inside a substantive heading must not match.
        assert!(!is_metadata_only_heading("Pricing Update"));
    }

    #[test]
    fn test_pack_detection_by_id_suffix() {
        assert!(is_pack_artifact("HBAG-MARKET-PACK", "docs/anything.md"));
        assert!(is_pack_artifact(
            "HBAG-SELL-AGGREGATE-PACK",
            "docs/anything.md"
        ));
        assert!(!is_pack_artifact("HBAG-STRATEGY-INSIGHT-LOG", "docs/log.md"));
    }

    #[test]
    fn test_pack_detection_by_path() {
        assert!(is_pack_artifact(
            "HBAG-CUSTOM",
            "docs/strategy/HBAG/sell-pack.user.md"
        ));
        assert!(!is_pack_artifact(
            "HBAG-CUSTOM",
            "docs/strategy/HBAG/insight-log.user.md"
        ));
    }

    #[test]
    fn test_self_trigger_processes() {
        assert!(is_self_trigger_process("lp-do-briefing"));
        assert!(is_self_trigger_process("  Projection-Compiler "));
        assert!(!is_self_trigger_process("operator-edit"));
    }

    #[test]
    fn test_domain_area_table() {
        assert_eq!(area_anchor_for_domain("SELL"), Some("channel-strategy"));
        assert_eq!(area_anchor_for_domain("market"), Some("market-intelligence"));
        assert_eq!(area_anchor_for_domain("UNKNOWN-DOMAIN"), None);
    }
}
