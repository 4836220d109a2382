//! Placeholder substitution engine
//!
//! Replaces `%NAME%` tokens with values from a [`Config`]. Matching is a
//! single left-to-right pass over non-overlapping tokens; substituted values
//! are never scanned again.

use crate::config::Config;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Value used for placeholders with no matching key
pub const MISSING_VALUE: &str = "";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Z][A-Z0-9_]*)%").expect("placeholder pattern is valid"));

/// Substitute every placeholder of `text` with its config value
#[must_use]
pub fn substitute(text: &str, config: &Config) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            config.get(&caps[1]).unwrap_or(MISSING_VALUE).to_owned()
        })
        .into_owned()
}

/// Distinct placeholder keys referenced by `text`
#[must_use]
pub fn placeholders(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_owned())
        .collect()
}
