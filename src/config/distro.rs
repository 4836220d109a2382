//! Host distribution detection from `os-release`

use crate::system::System;
use anyhow::{Context as _, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Default location of the os-release file
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

static OS_RELEASE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(NAME|VERSION_CODENAME|ID|VERSION_ID)="?([^\n"]+)"#)
        .expect("os-release pattern is valid")
});

/// Distribution identity of the build host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub codename: String,
}

impl DistributionInfo {
    /// Parse the contents of an os-release file
    ///
    /// Unknown fields are ignored, missing ones stay empty.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut info = Self::default();
        for caps in OS_RELEASE_FIELD.captures_iter(content) {
            let value = caps[2].to_owned();
            match &caps[1] {
                "NAME" => info.name = value,
                "ID" => info.id = value,
                "VERSION_ID" => info.version = value,
                "VERSION_CODENAME" => info.codename = value,
                _ => {}
            }
        }
        info
    }

    /// Read the distribution of the build host
    ///
    /// # Errors
    ///
    /// Returns an error if the os-release file cannot be read
    pub fn load(system: &dyn System, path: &Path) -> Result<Self> {
        let content = system
            .read_to_string(path)
            .with_context(|| format!("Failed to read distribution infos: {}", path.display()))?;
        Ok(Self::parse(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_values() {
        let info = DistributionInfo::parse(
            "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\n\
             NAME=\"Debian GNU/Linux\"\n\
             VERSION_ID=\"12\"\n\
             VERSION=\"12 (bookworm)\"\n\
             VERSION_CODENAME=bookworm\n\
             ID=debian\n",
        );

        assert_eq!(
            info,
            DistributionInfo {
                id: "debian".to_owned(),
                name: "Debian GNU/Linux".to_owned(),
                version: "12".to_owned(),
                codename: "bookworm".to_owned(),
            }
        );
    }

    #[test]
    fn ignores_like_fields() {
        let info = DistributionInfo::parse("ID_LIKE=debian\nID=ubuntu\n");
        assert_eq!(info.id, "ubuntu");
    }
}
