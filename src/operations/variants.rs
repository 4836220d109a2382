//! Build variants derived from the `PYBUILD` key
//!
//! `PYBUILD=2,3` renders selected template files once per Python flavour:
//! `foo.service` becomes `python-foo.foo.service` and `python3-foo.foo.service`,
//! each with `PYTHON_VERSION_NUM` set for its flavour.

use crate::config::Config;
use crate::error::PackagerError;
use anyhow::Result;

/// Python flavours: `(PYBUILD entry, variant tag, version key)`
const PYTHON_FLAVOURS: [(&str, &str, &str); 2] = [
    ("2", "python", "PYTHON_VERSION_2"),
    ("3", "python3", "PYTHON_VERSION_3"),
];

/// One build variant with its own configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub tag: String,
    pub config: Config,
}

/// Variants requested by `PYBUILD`, in order of first appearance
///
/// Unknown entries are ignored and duplicates are dropped.
#[must_use]
pub fn build_variants(config: &Config) -> Vec<Variant> {
    let mut variants: Vec<Variant> = Vec::new();

    for entry in config.get("PYBUILD").unwrap_or_default().split(',') {
        let Some((_, tag, version_key)) = PYTHON_FLAVOURS
            .iter()
            .find(|(name, _, _)| *name == entry.trim())
        else {
            continue;
        };
        if variants.iter().any(|v| v.tag == *tag) {
            continue;
        }

        let version = config.get(version_key).unwrap_or_default();
        variants.push(Variant {
            tag: (*tag).to_owned(),
            config: config.with_value("PYTHON_VERSION_NUM", version),
        });
    }

    variants
}

/// Output names and configs for one template file
///
/// # Errors
///
/// Returns a configuration error when variants exist but `PROJECT_NAME`
/// is unset
pub fn destinations(
    file_name: &str,
    config: &Config,
    variants: &[Variant],
) -> Result<Vec<(String, Config)>> {
    if variants.is_empty() {
        return Ok(vec![(file_name.to_owned(), config.clone())]);
    }

    let Some(project_name) = config.get("PROJECT_NAME") else {
        return Err(PackagerError::configuration(
            "PYBUILD variants need PROJECT_NAME (add it to the target file or use --project-name)",
        )
        .into());
    };

    let fan_out = |name: &dyn Fn(&str) -> String| {
        variants
            .iter()
            .map(|v| (name(&v.tag), v.config.clone()))
            .collect::<Vec<_>>()
    };

    if file_name.ends_with(".service") {
        Ok(fan_out(&|tag| format!("{tag}-{project_name}.{file_name}")))
    } else if file_name.starts_with(&format!("{project_name}.")) {
        Ok(fan_out(&|tag| format!("{tag}-{file_name}")))
    } else {
        Ok(vec![(file_name.to_owned(), config.clone())])
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    fn names(destinations: &[(String, Config)]) -> Vec<&str> {
        destinations.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn no_pybuild_means_no_variants() {
        assert!(build_variants(&Config::from_pairs([("PROJECT_NAME", "foo")])).is_empty());
        assert!(build_variants(&Config::from_pairs([("PYBUILD", "4, x")])).is_empty());
    }

    #[test]
    fn variants_set_python_version_num() {
        let config = Config::from_pairs([
            ("PYBUILD", "3,2,3"),
            ("PYTHON_VERSION_3", "3.11"),
        ]);
        let variants = build_variants(&config);

        assert_eq!(
            variants.iter().map(|v| v.tag.as_str()).collect::<Vec<_>>(),
            vec!["python3", "python"]
        );
        assert_eq!(variants[0].config.get("PYTHON_VERSION_NUM"), Some("3.11"));
        assert_eq!(variants[1].config.get("PYTHON_VERSION_NUM"), Some(""));
        assert_eq!(config.get("PYTHON_VERSION_NUM"), None);
    }

    #[test]
    fn destinations_fan_out_services_and_project_files() {
        let config = Config::from_pairs([("PYBUILD", "2,3"), ("PROJECT_NAME", "foo")]);
        let variants = build_variants(&config);

        let service = destinations("foo.service", &config, &variants).unwrap();
        assert_eq!(
            names(&service),
            vec!["python-foo.foo.service", "python3-foo.foo.service"]
        );

        let install = destinations("foo.install", &config, &variants).unwrap();
        assert_eq!(names(&install), vec!["python-foo.install", "python3-foo.install"]);

        let control = destinations("control", &config, &variants).unwrap();
        assert_eq!(names(&control), vec!["control"]);
        assert_eq!(control[0].1, config);
    }

    #[test]
    fn fan_out_without_project_name_is_rejected() {
        let config = Config::from_pairs([("PYBUILD", "3")]);
        let variants = build_variants(&config);
        assert!(destinations("control", &config, &variants).is_err());
        assert!(destinations("control", &config, &[]).is_ok());
    }
}
