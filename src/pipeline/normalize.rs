//! Major-label normalization.
//!
//! Pure string transformation, no I/O. Upstream labels arrive with
//! arbitrary casing and whitespace; they are trimmed and title-cased,
//! except that initialism tokens ("B.S.", "A.A.") are upper-cased
//! wholesale.

use regex::Regex;
use std::sync::OnceLock;

/// Matches tokens of two or more single letters each followed by a
/// period, with an optional trailing bare letter and optional trailing
/// period (e.g. "B.S.", "a.s.t", "M.B.A").
fn initialism_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:[A-Za-z]\.){2,}[A-Za-z]?\.?$").unwrap())
}

/// Normalize a raw major label.
///
/// Splits on whitespace, title-cases ordinary tokens (first letter
/// upper, remainder lower), upper-cases initialism tokens, and rejoins
/// with single spaces. Idempotent: `normalize(normalize(s)) ==
/// normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(normalize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_token(token: &str) -> String {
    if initialism_pattern().is_match(token) {
        return token.to_uppercase();
    }

    let mut chars = token.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}
