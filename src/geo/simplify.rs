//! Address simplification
//!
//! Degrades an address string into a looser query for a second forward
//! geocode attempt. House and building numbers, "No. 42"-style prefixes,
//! digits and punctuation other than commas are removed.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\.?\s*\d[\w/-]*").expect("valid regex"));
static HOUSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#?\b\d[\w/-]*").expect("valid regex"));
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid regex"));
static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M},\s]").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Simplify an address for a fallback geocode
///
/// Deterministic; the result contains only letters, commas and single
/// spaces. Empty comma segments are dropped.
pub fn simplify(text: &str) -> String {
    let text = NUMBER_PREFIX_RE.replace_all(text, " ");
    let text = HOUSE_NUMBER_RE.replace_all(&text, " ");
    let text = DIGIT_RE.replace_all(&text, "");
    let text = PUNCT_RE.replace_all(&text, " ");
    let text = SPACE_RE.replace_all(&text, " ");

    text.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
