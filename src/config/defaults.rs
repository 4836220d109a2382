//! Built-in defaults, the first configuration layer

use super::distro::{DistributionInfo, OS_RELEASE_PATH};
use super::{ConfigBuilder, ConfigMap};
use crate::system::System;
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_ARCH: &str = "any";
pub const DEFAULT_URGENCY: &str = "low";
pub const DEFAULT_UTC: &str = "0200";
pub const DEFAULT_MAINTAINER: &str = "Packaging Team <packaging@localhost>";

/// Values supplied on the command line that seed the configuration
#[derive(Debug, Clone)]
pub struct Defaults {
    pub distribution_id: Option<String>,
    pub distribution_name: Option<String>,
    pub distribution_version: Option<String>,
    /// Fill missing distribution fields from the host's os-release file
    pub load_distribution_infos: bool,
    pub package_distribution: Option<String>,
    pub project_name: Option<String>,
    pub project_version: Option<String>,
    pub maintainer: String,
    pub urgency: String,
    pub utc: String,
    pub arch: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            distribution_id: None,
            distribution_name: None,
            distribution_version: None,
            load_distribution_infos: false,
            package_distribution: None,
            project_name: None,
            project_version: None,
            maintainer: DEFAULT_MAINTAINER.to_owned(),
            urgency: DEFAULT_URGENCY.to_owned(),
            utc: DEFAULT_UTC.to_owned(),
            arch: DEFAULT_ARCH.to_owned(),
        }
    }
}

/// Seed a builder with the default layer
///
/// Distribution fields are always present (empty when unknown). Project and
/// package distribution keys are only set when supplied, so that target
/// files and normalization can still provide them.
///
/// # Errors
///
/// Returns an error if distribution infos are requested and the os-release
/// file cannot be read
pub fn load_defaults(system: &dyn System, defaults: &Defaults) -> Result<ConfigBuilder> {
    let host = if defaults.load_distribution_infos {
        let info = DistributionInfo::load(system, Path::new(OS_RELEASE_PATH))?;
        debug!("Host distribution: {info:?}");
        Some(info)
    } else {
        None
    };

    let mut values = ConfigMap::new();
    values.insert(
        "DIST_ID".to_owned(),
        pick(&defaults.distribution_id, host.as_ref().map(|i| i.id.as_str())),
    );
    values.insert(
        "DIST_NAME".to_owned(),
        pick(&defaults.distribution_name, host.as_ref().map(|i| i.name.as_str())),
    );
    values.insert(
        "DIST_VERSION".to_owned(),
        pick(
            &defaults.distribution_version,
            host.as_ref().map(|i| i.version.as_str()),
        ),
    );
    if let Some(info) = host.as_ref() {
        values.insert("DIST_CODENAME".to_owned(), info.codename.clone());
    }

    let optional = [
        ("PKG_DISTRIBUTION", &defaults.package_distribution),
        ("PROJECT_NAME", &defaults.project_name),
        ("PROJECT_VERSION", &defaults.project_version),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            values.insert(key.to_owned(), value.clone());
        }
    }

    values.insert("URGENCY".to_owned(), defaults.urgency.clone());
    values.insert("MAINTAINER".to_owned(), defaults.maintainer.clone());
    values.insert("ARCH".to_owned(), defaults.arch.clone());
    values.insert("UTC".to_owned(), defaults.utc.clone());

    Ok(ConfigBuilder::from_map(values))
}

fn pick(explicit: &Option<String>, detected: Option<&str>) -> String {
    explicit
        .clone()
        .or_else(|| detected.map(str::to_owned))
        .unwrap_or_default()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn seeds_arch_and_empty_distribution() {
        let system = MockSystem::new();
        let config = load_defaults(&system, &Defaults::default())
            .unwrap()
            .build();

        assert_eq!(config.get("ARCH"), Some("any"));
        assert_eq!(config.get("DIST_ID"), Some(""));
        assert_eq!(config.get("DIST_NAME"), Some(""));
        assert_eq!(config.get("PKG_DISTRIBUTION"), Some(""));
        assert!(!config.contains_key("PROJECT_NAME"));
        assert!(!config.contains_key("TARGET_NAME"));
    }

    #[test]
    fn explicit_values_win_over_host() {
        let system = MockSystem::new()
            .with_file(
                OS_RELEASE_PATH,
                b"ID=ubuntu\nNAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nVERSION_CODENAME=jammy\n",
            )
            .unwrap();
        let defaults = Defaults {
            distribution_version: Some("24.04".to_owned()),
            load_distribution_infos: true,
            ..Defaults::default()
        };

        let config = load_defaults(&system, &defaults).unwrap().build();

        assert_eq!(config.get("DIST_ID"), Some("ubuntu"));
        assert_eq!(config.get("DIST_NAME"), Some("Ubuntu"));
        assert_eq!(config.get("DIST_VERSION"), Some("24.04"));
        assert_eq!(config.get("DIST_CODENAME"), Some("jammy"));
        assert_eq!(config.get("PKG_DISTRIBUTION"), Some("unstable"));
        assert_eq!(config.get("TARGET_NAME"), Some("+ubuntu"));
    }

    #[test]
    fn missing_os_release_is_an_error() {
        let system = MockSystem::new();
        let defaults = Defaults {
            load_distribution_infos: true,
            ..Defaults::default()
        };
        assert!(load_defaults(&system, &defaults).is_err());
    }
}
