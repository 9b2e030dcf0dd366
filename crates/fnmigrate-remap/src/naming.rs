//! Target naming rules
//!
//! Target names follow the Kubernetes DNS label rules: lowercase letters,
//! digits and hyphens, starting and ending alphanumeric, shorter than
//! [`MAX_NAME_LEN`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Exclusive upper bound on a target name's length
pub const MAX_NAME_LEN: usize = 63;

/// Room kept free after truncation for a `-N` disambiguation suffix
pub const SUFFIX_RESERVE: usize = 4;

static VALID_NAME: Lazy<Regex> = Lazy::new(|| compile(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$"));
static DISALLOWED: Lazy<Regex> = Lazy::new(|| compile(r"[^-a-z0-9]"));
static LEADING_NON_ALPHA: Lazy<Regex> = Lazy::new(|| compile(r"^[^a-z]+"));
static TRAILING_NON_ALNUM: Lazy<Regex> = Lazy::new(|| compile(r"[^a-z0-9]+$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Whether `name` is usable on the target platform as is
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    name.len() < MAX_NAME_LEN && VALID_NAME.is_match(name)
}

/// Derive a disambiguation base from an arbitrary legacy name
///
/// Lowercases, turns every character outside `[-a-z0-9]` into `-`, strips
/// leading characters that are not letters and trailing characters that are
/// not alphanumeric, then truncates to `MAX_NAME_LEN - SUFFIX_RESERVE` bytes.
///
/// The result may be empty, and truncation may leave a trailing hyphen.
#[must_use]
pub fn derive_candidate(name: &str) -> String {
    // One char in, one char out: multi-char lowercase expansions keep only
    // their first char.
    let lowered: String = name
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();
    let replaced = DISALLOWED.replace_all(&lowered, "-");
    let trimmed = LEADING_NON_ALPHA.replace(&replaced, "");
    let mut candidate = TRAILING_NON_ALNUM.replace(&trimmed, "").into_owned();
    // Only ASCII survives the replacement, so any byte index is a char boundary.
    candidate.truncate(MAX_NAME_LEN - SUFFIX_RESERVE);
    candidate
}
