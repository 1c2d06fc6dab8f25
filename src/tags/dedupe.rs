//! Normalising free-text tag input

/// Split a comma-separated tag list into unique, trimmed, non-empty names
///
/// First occurrence wins, so the result keeps the order the user typed.
#[must_use]
pub fn dedupe_tags(input: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !seen.iter().any(|s| s == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Canonical text form of a tag list: deduplicated names joined by `,`
#[must_use]
pub fn canonical_tags(input: &str) -> String {
    dedupe_tags(input).join(",")
}
