//! Version extraction, rewriting and ordering

pub mod compare;
pub mod pattern;

use crate::error::PackagerError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::ops::Range;
use std::path::Path;

pub use compare::{StructuredVersion, decompose, less_than, next_patch_version, same_release_line};
pub use pattern::{DEFAULT_VERSION_PATTERN, build_reference_pattern, compile_pattern};

/// Version found in a text, with the location of the raw match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedVersion {
    /// Normalized version
    pub version: String,
    /// Byte range of the first capture group in `original_text`
    pub span: Range<usize>,
    pub original_text: String,
}

impl ExtractedVersion {
    /// Raw text of the match, before normalization
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.original_text[self.span.clone()]
    }

    /// `original_text` with the matched version replaced by `new_version`
    #[must_use]
    pub fn replaced_with(&self, new_version: &str) -> String {
        rewrite(&self.original_text, self.span.clone(), new_version)
    }
}

/// Identity normalizer
#[must_use]
pub fn keep_version(version: &str) -> String {
    version.to_owned()
}

/// Find the first match of `pattern` in `text`
///
/// # Errors
///
/// Returns an error if:
/// - The pattern is invalid
/// - The pattern does not match, or its first group did not participate
pub fn extract(
    pattern: &str,
    text: &str,
    normalizer: impl Fn(&str) -> String,
) -> Result<ExtractedVersion> {
    extract_from(pattern, text, "<text>", normalizer)
}

/// Read a file and extract its version
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no version
pub fn read_version_file(
    system: &dyn System,
    path: &Path,
    pattern: &str,
    normalizer: impl Fn(&str) -> String,
) -> Result<ExtractedVersion> {
    let text = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read version file: {}", path.display()))?;
    extract_from(pattern, &text, &path.display().to_string(), normalizer)
}

fn extract_from(
    pattern: &str,
    text: &str,
    source_name: &str,
    normalizer: impl Fn(&str) -> String,
) -> Result<ExtractedVersion> {
    let regex = compile_pattern(pattern)?;
    let group = regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| PackagerError::version_not_found(pattern, source_name))?;

    Ok(ExtractedVersion {
        version: normalizer(group.as_str()),
        span: group.range(),
        original_text: text.to_owned(),
    })
}

/// Splice `new_version` into `text` at `span`
///
/// Every byte outside the span is preserved. A span that does not fall on
/// character boundaries leaves the text untouched.
#[must_use]
pub fn rewrite(text: &str, span: Range<usize>, new_version: &str) -> String {
    let (Some(head), Some(tail)) = (text.get(..span.start), text.get(span.end..)) else {
        return text.to_owned();
    };

    let mut out = String::with_capacity(head.len() + new_version.len() + tail.len());
    out.push_str(head);
    out.push_str(new_version);
    out.push_str(tail);
    out
}
