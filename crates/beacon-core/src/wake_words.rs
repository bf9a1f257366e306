//! Wake-word sanitization and wire codec.
//!
//! Wake-word matching downstream is case-insensitive, so duplicates that
//! differ only by case are redundant and must not accumulate across repeated
//! sanitize/save cycles. `sanitize` is idempotent for that reason.
//!
//! The codec is deliberately forgiving: decoding never fails. Malformed or
//! absent stored data degrades to an empty list, which callers replace with
//! the defaults.

use std::collections::HashSet;

/// Wake words used when nothing valid is stored.
pub const DEFAULT_WAKE_WORDS: [&str; 2] = ["clawd", "claude"];

/// The defaults as owned strings, for use as a sanitize fallback.
#[must_use]
pub fn default_wake_words() -> Vec<String> {
    DEFAULT_WAKE_WORDS.iter().map(|w| (*w).to_string()).collect()
}

/// Reduce `candidates` to a clean list.
///
/// Each candidate is trimmed; empty results are dropped; duplicates are
/// removed case-insensitively, keeping the first occurrence's original
/// casing and relative order. Returns `fallback` unchanged when nothing
/// survives. Pure and total.
#[must_use]
pub fn sanitize(candidates: &[String], fallback: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    if out.is_empty() {
        fallback.to_vec()
    } else {
        out
    }
}

/// Encode a sanitized list as a compact JSON array string.
///
/// Order is preserved and no surrounding whitespace is added.
#[must_use]
pub fn encode_list(words: &[String]) -> String {
    serde_json::to_string(words).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored wake-word string.
///
/// Returns an empty list for absent, blank, non-array, or unparseable
/// input. Non-string and null array elements are dropped; string elements
/// are trimmed; elements that become empty are dropped.
#[must_use]
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(r) => r.trim(),
        None => return Vec::new(),
    };
    if raw.is_empty() {
        return Vec::new();
    }
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };
    let items = match parsed {
        serde_json::Value::Array(items) => items,
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect()
}
