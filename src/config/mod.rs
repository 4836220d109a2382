//! Configuration resolution
//!
//! The package configuration is a flat `KEY -> value` mapping resolved in
//! layers: built-in defaults, then the target file (with its includes),
//! then command-line overrides, then normalization of derived keys.
//! [`ConfigBuilder`] enforces that order and hands out a read-only [`Config`].

pub mod defaults;
pub mod distro;
pub mod target;

use crate::error::PackagerError;
use crate::system::System;
use anyhow::Result;
use core::fmt::Write as _;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

pub use defaults::{Defaults, load_defaults};
pub use distro::DistributionInfo;
pub use target::read_config;

/// Mutable mapping used while the configuration is being resolved
pub type ConfigMap = BTreeMap<String, String>;

/// Identifier grammar shared by config keys and template placeholders
pub const KEY_PATTERN: &str = "[A-Z][A-Z0-9_]*";

static OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({KEY_PATTERN})(\+?=)(.*)")).expect("override pattern is valid")
});

/// Finalized, read-only package configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Config {
    values: ConfigMap,
}

impl Config {
    /// Build a configuration directly from key/value pairs
    ///
    /// No normalization is applied.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }

    /// Get a value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check whether a key is set
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over entries sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this configuration with `key` set to `value`
    #[must_use]
    pub fn with_value(&self, key: &str, value: &str) -> Self {
        let mut values = self.values.clone();
        values.insert(key.to_owned(), value.to_owned());
        Self { values }
    }

    /// Copy of this configuration with `key` set only if it was absent
    #[must_use]
    pub fn with_default(&self, key: &str, value: &str) -> Self {
        let mut values = self.values.clone();
        values
            .entry(key.to_owned())
            .or_insert_with(|| value.to_owned());
        Self { values }
    }

    /// Render as `KEY = value` lines
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            let _ = writeln!(out, "{key} = {value}");
        }
        out
    }
}

/// Layered configuration builder
///
/// Layers must be applied in order: defaults, target file, overrides.
/// [`ConfigBuilder::build`] normalizes and freezes the result.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    values: ConfigMap,
}

impl ConfigBuilder {
    /// Start from an empty mapping
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing mapping
    #[must_use]
    pub const fn from_map(values: ConfigMap) -> Self {
        Self { values }
    }

    /// Current value of a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a key, replacing any previous value
    #[must_use]
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Merge a target file (and its includes) on top of the current values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The target file or one of its includes does not exist
    /// - The include chain loops back on itself
    pub fn read_target(mut self, system: &dyn System, path: &Path) -> Result<Self> {
        read_config(system, path, &mut self.values)?;
        Ok(self)
    }

    /// Apply `KEY=value` / `KEY+=value` assignments
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing every assignment that does not
    /// follow the grammar. Valid assignments of the same batch are still
    /// applied to the discarded builder, so callers must stop on error.
    pub fn apply_overrides<S: AsRef<str>>(mut self, assignments: &[S]) -> Result<Self> {
        let unparsed = apply_overrides(&mut self.values, assignments);
        if !unparsed.is_empty() {
            return Err(PackagerError::configuration(format!(
                "Parse error on -s / --variable: \"{}\"",
                unparsed.join("\", \"")
            ))
            .into());
        }
        Ok(self)
    }

    /// Normalize derived keys and freeze the configuration
    #[must_use]
    pub fn build(mut self) -> Config {
        normalize(&mut self.values);
        Config {
            values: self.values,
        }
    }
}

/// Apply override assignments, returning those that do not parse
///
/// `KEY=value` replaces, `KEY+=value` appends to the current value (or to
/// the empty string when the key is unset).
pub fn apply_overrides<S: AsRef<str>>(values: &mut ConfigMap, assignments: &[S]) -> Vec<String> {
    let mut unparsed = Vec::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let Some(caps) = OVERRIDE.captures(assignment) else {
            unparsed.push(assignment.to_owned());
            continue;
        };

        let key = &caps[1];
        let value = &caps[3];
        if &caps[2] == "=" {
            values.insert(key.to_owned(), value.to_owned());
        } else {
            values.entry(key.to_owned()).or_default().push_str(value);
        }
    }
    unparsed
}

/// Fill `PKG_DISTRIBUTION` and `TARGET_NAME` from `DIST_ID` when absent
///
/// Running it again once both keys are set changes nothing.
pub fn normalize(values: &mut ConfigMap) {
    let Some(dist_id) = values.get("DIST_ID").cloned() else {
        return;
    };
    let is_ubuntu = dist_id.eq_ignore_ascii_case("ubuntu");

    if !values.contains_key("PKG_DISTRIBUTION") {
        let distribution = if is_ubuntu {
            "unstable".to_owned()
        } else {
            dist_id.clone()
        };
        values.insert("PKG_DISTRIBUTION".to_owned(), distribution);
    }

    if is_ubuntu && !values.contains_key("TARGET_NAME") {
        values.insert("TARGET_NAME".to_owned(), format!("+{dist_id}"));
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn overrides_replace_append_and_report() {
        let mut values = map(&[("V", "x")]);
        let unparsed = apply_overrides(
            &mut values,
            &["XYZ", "X-Y", "X=", "ABC=123", "V+=y", "NEW+=z"],
        );
        assert_eq!(
            values,
            map(&[("V", "xy"), ("X", ""), ("ABC", "123"), ("NEW", "z")])
        );
        assert_eq!(unparsed, vec!["XYZ", "X-Y"]);
    }

    #[test]
    fn override_value_keeps_equal_signs() {
        let mut values = ConfigMap::new();
        assert!(apply_overrides(&mut values, &["OPTS=a=b"]).is_empty());
        assert_eq!(values.get("OPTS").unwrap(), "a=b");
    }

    #[test]
    fn builder_rejects_malformed_overrides() {
        let err = ConfigBuilder::new()
            .apply_overrides(&["lower=1", "OK=1", "1BAD=2"])
            .unwrap_err();
        let err = err.downcast::<PackagerError>().unwrap();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("\"lower=1\", \"1BAD=2\""));
    }

    #[test]
    fn normalize_debian_like() {
        let mut values = map(&[("DIST_ID", "squeeze")]);
        normalize(&mut values);
        assert_eq!(
            values,
            map(&[("DIST_ID", "squeeze"), ("PKG_DISTRIBUTION", "squeeze")])
        );
    }

    #[test]
    fn normalize_ubuntu() {
        let mut values = map(&[("DIST_ID", "ubuntu")]);
        normalize(&mut values);
        assert_eq!(
            values,
            map(&[
                ("DIST_ID", "ubuntu"),
                ("PKG_DISTRIBUTION", "unstable"),
                ("TARGET_NAME", "+ubuntu")
            ])
        );

        let mut values = map(&[("DIST_ID", "Ubuntu")]);
        normalize(&mut values);
        assert_eq!(values.get("PKG_DISTRIBUTION").unwrap(), "unstable");
        assert_eq!(values.get("TARGET_NAME").unwrap(), "+Ubuntu");
    }

    #[test]
    fn normalize_keeps_explicit_values() {
        let mut values = map(&[("DIST_ID", "squeeze"), ("PKG_DISTRIBUTION", "buble")]);
        normalize(&mut values);
        assert_eq!(
            values,
            map(&[("DIST_ID", "squeeze"), ("PKG_DISTRIBUTION", "buble")])
        );
    }

    #[test]
    fn normalize_without_dist_id_is_noop() {
        let mut values = map(&[("ARCH", "any")]);
        normalize(&mut values);
        assert_eq!(values, map(&[("ARCH", "any")]));
    }

    #[test]
    fn normalize_is_idempotent() {
        for dist in ["ubuntu", "debian", "", "UBUNTU"] {
            let mut once = map(&[("DIST_ID", dist)]);
            normalize(&mut once);
            let mut twice = once.clone();
            normalize(&mut twice);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn config_derivations_do_not_alias() {
        let base = Config::from_pairs([("A", "1")]);
        let changed = base.with_value("A", "2").with_default("B", "3");
        assert_eq!(base.get("A"), Some("1"));
        assert_eq!(changed.get("A"), Some("2"));
        assert_eq!(changed.with_default("A", "9").get("A"), Some("2"));
        assert_eq!(changed.to_text(), "A = 2\nB = 3\n");
    }
}
