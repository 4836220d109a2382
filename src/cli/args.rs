use crate::config::Defaults;
use crate::config::defaults::{DEFAULT_ARCH, DEFAULT_MAINTAINER, DEFAULT_URGENCY, DEFAULT_UTC};
use crate::operations::build::{DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_DIR};
use crate::operations::release::DEFAULT_COMMIT_MESSAGE;
use crate::operations::sync::DownstreamSync;
use crate::version::DEFAULT_VERSION_PATTERN;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Name of the downstream repository in prompts
pub const DOWNSTREAM_NAME: &str = "downstream";

/// Command-line arguments for pkgsmith
#[derive(Parser, Debug, Clone)]
#[command(name = "pkgsmith")]
#[command(about = "Render package templates, bump versions and tag releases")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Commands whose stdout is meant for scripts
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.command, Command::Version(_) | Command::Config(_))
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the version found in a file
    #[command(visible_alias = "get")]
    Version(VersionArgs),

    /// Print the resolved configuration
    #[command(visible_alias = "show")]
    Config(ConfigCommandArgs),

    /// Render the package templates and optionally build the package
    Build(BuildArgs),

    /// Bump the version, commit, tag and push a release
    #[command(visible_alias = "tag")]
    CreateTag(CreateTagArgs),

    /// Pin a version in the downstream repository
    Sync(SyncArgs),

    /// Prepend an entry to the template changelog
    Changelog(ChangelogArgs),
}

/// Output format of the `config` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    /// `KEY = value` lines
    #[default]
    Text,
    Json,
    Yaml,
}

/// Version file and extraction pattern
#[derive(ClapArgs, Debug, Clone)]
pub struct VersionFileArgs {
    /// File that contains the version to be extracted
    #[arg(short = 'V', long, value_name = "PATH")]
    pub version_file: Option<PathBuf>,

    /// Pattern for the version extractor (first group is the version)
    #[arg(short = 'P', long, value_name = "REGEX", default_value = DEFAULT_VERSION_PATTERN)]
    pub pattern_version: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct VersionArgs {
    /// File that contains the version to be extracted
    #[arg(short = 'V', long, value_name = "PATH")]
    pub version_file: PathBuf,

    /// Pattern for the version extractor (first group is the version)
    #[arg(short = 'P', long, value_name = "REGEX", default_value = DEFAULT_VERSION_PATTERN)]
    pub pattern_version: String,
}

/// Configuration layers: defaults, target file, overrides
#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigArgs {
    /// Target file path
    #[arg(short = 't', long, value_name = "PATH")]
    pub target_file: Option<PathBuf>,

    #[arg(short = 'n', long, value_name = "NAME")]
    pub project_name: Option<String>,

    #[arg(long, value_name = "VERSION")]
    pub project_version: Option<String>,

    #[arg(short = 'D', long)]
    pub package_distribution: Option<String>,

    #[arg(long, default_value = DEFAULT_MAINTAINER)]
    pub maintainer: String,

    #[arg(long)]
    pub distribution_id: Option<String>,

    #[arg(long)]
    pub distribution_name: Option<String>,

    #[arg(long)]
    pub distribution_version: Option<String>,

    /// Read missing distribution fields from /etc/os-release
    #[arg(long)]
    pub load_distribution_infos: bool,

    #[arg(long, default_value = DEFAULT_URGENCY)]
    pub urgency: String,

    #[arg(long, default_value = DEFAULT_UTC)]
    pub utc: String,

    #[arg(long, default_value = DEFAULT_ARCH)]
    pub arch: String,

    /// Override a value: VARIABLE=VALUE or VARIABLE+=VALUE
    #[arg(short = 's', long = "variable", value_name = "VARIABLE=VALUE")]
    pub variables: Vec<String>,
}

impl ConfigArgs {
    /// Default layer seeded from these arguments
    #[must_use]
    pub fn defaults(&self) -> Defaults {
        Defaults {
            distribution_id: self.distribution_id.clone(),
            distribution_name: self.distribution_name.clone(),
            distribution_version: self.distribution_version.clone(),
            load_distribution_infos: self.load_distribution_infos,
            package_distribution: self.package_distribution.clone(),
            project_name: self.project_name.clone(),
            project_version: self.project_version.clone(),
            maintainer: self.maintainer.clone(),
            urgency: self.urgency.clone(),
            utc: self.utc.clone(),
            arch: self.arch.clone(),
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigCommandArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub version: VersionFileArgs,

    #[arg(long, value_enum, default_value_t = ConfigFormat::Text)]
    pub format: ConfigFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub version: VersionFileArgs,

    /// Build directory
    #[arg(short = 'o', long, value_name = "DIRNAME", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_build: PathBuf,

    /// Keep the build directory after the build
    #[arg(long)]
    pub no_clean: bool,

    /// Package template directories, rendered in order
    #[arg(
        short = 'd',
        long,
        value_name = "DIRNAMES",
        num_args = 1..,
        default_value = DEFAULT_TEMPLATE_DIR
    )]
    pub package_template_dir: Vec<PathBuf>,

    /// Run dpkg-buildpackage
    #[arg(short = 'b', long)]
    pub build_package: bool,

    /// Disable every git check
    #[arg(long)]
    pub no_check: bool,

    /// Do not require a clean working tree
    #[arg(long)]
    pub no_check_uncommitted: bool,

    /// Do not require PROJECT_VERSION to be the last tag
    #[arg(long)]
    pub no_check_version: bool,
}

/// Downstream repository settings shared by `sync` and `create-tag`
#[derive(ClapArgs, Debug, Clone)]
pub struct DownstreamArgs {
    /// Path of the downstream repository
    #[arg(short = 'u', long, value_name = "PATH")]
    pub downstream_path: Option<PathBuf>,

    /// File that contains the reference version, relative to the downstream path
    #[arg(long, value_name = "PATH")]
    pub reference_file: Option<PathBuf>,

    /// Pattern of the reference version
    #[arg(long, value_name = "REGEX")]
    pub pattern_reference: Option<String>,

    #[arg(
        short = 'B',
        long,
        value_name = "BRANCH",
        env = "DEFAULT_DOWNSTREAM_BRANCH",
        default_value = "main"
    )]
    pub downstream_branch: String,

    /// Update the reference file without committing
    #[arg(short = 'n', long)]
    pub no_downstream_commit: bool,

    /// Do not rebase the downstream branch before updating it
    #[arg(short = 'p', long)]
    pub no_downstream_pull: bool,

    /// Commit without pushing
    #[arg(long)]
    pub no_downstream_push: bool,

    /// Skip the clean tree check and the downstream pull
    #[arg(short = 'g', long)]
    pub ignore_change_and_not_pull: bool,

    #[arg(long, value_name = "NAME", env = "DEFAULT_REPO_NAME")]
    pub application_name: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DownstreamArgs {
    /// Sync settings, `None` without a reference file
    #[must_use]
    pub fn settings(&self) -> Option<DownstreamSync> {
        let reference_file = self.reference_file.clone()?;
        Some(DownstreamSync {
            repository_name: DOWNSTREAM_NAME.to_owned(),
            branch: self.downstream_branch.clone(),
            reference_file,
            pattern: self.pattern_reference.clone(),
            application_name: self.application_name.clone(),
            pull: !(self.no_downstream_pull || self.ignore_change_and_not_pull),
            commit: !self.no_downstream_commit,
            push: !self.no_downstream_push,
            assume_yes: self.yes,
        })
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub version: VersionFileArgs,

    #[command(flatten)]
    pub downstream: DownstreamArgs,

    /// Version to pin instead of the one of the version file
    #[arg(long, value_name = "VERSION")]
    pub force_version: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CreateTagArgs {
    #[command(flatten)]
    pub version: VersionFileArgs,

    #[command(flatten)]
    pub downstream: DownstreamArgs,

    /// New version, defaults to the next patch version
    #[arg(long, value_name = "VERSION")]
    pub force_version: Option<String>,

    /// Branch to push
    #[arg(short = 'b', long, value_name = "BRANCH", env = "DEFAULT_BRANCH")]
    pub branch: Option<String>,

    /// Do not update the downstream repository
    #[arg(short = 'U', long)]
    pub no_downstream_update: bool,

    /// Accept a version that is not greater than the current one
    #[arg(long)]
    pub force: bool,

    /// Release even with uncommitted changes in the working tree
    #[arg(long)]
    pub no_check_uncommitted: bool,

    /// Regex prefix the current and new versions must share, e.g. '\d+\.\d+'
    #[arg(long, value_name = "REGEX")]
    pub release_line: Option<String>,

    /// Create an annotated tag
    #[arg(long)]
    pub annotate: bool,

    /// Only rewrite the version file
    #[arg(long)]
    pub no_commit: bool,

    /// Commit and tag without pushing
    #[arg(long)]
    pub no_push: bool,

    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Commit message, `{version}` is replaced by the new version
    #[arg(short = 'm', long, default_value = DEFAULT_COMMIT_MESSAGE)]
    pub message: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ChangelogArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub version: VersionFileArgs,

    /// Template directories whose changelog is updated
    #[arg(
        short = 'd',
        long,
        value_name = "DIRNAMES",
        num_args = 1..,
        default_value = DEFAULT_TEMPLATE_DIR
    )]
    pub package_template_dir: Vec<PathBuf>,

    /// Change line, repeatable; opens $EDITOR when absent
    #[arg(short = 'm', long = "message", value_name = "TEXT")]
    pub messages: Vec<String>,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn aliases_select_subcommands() {
        let args = Args::try_parse_from(["pkgsmith", "get", "-V", "setup.py"]).unwrap();
        assert!(matches!(args.command, Command::Version(_)));
        assert!(args.is_read_only());

        let args = Args::try_parse_from(["pkgsmith", "tag", "-U", "--no-push"]).unwrap();
        assert!(matches!(args.command, Command::CreateTag(_)));
        assert!(!args.is_read_only());
    }

    #[test]
    fn repeated_variables_and_template_dirs() {
        let args = Args::try_parse_from([
            "pkgsmith", "build", "-s", "A=1", "-s", "B+=2", "-d", "t1", "t2", "--no-check",
        ])
        .unwrap();
        let Command::Build(build) = args.command else {
            panic!("expected build");
        };
        assert_eq!(build.config.variables, vec!["A=1", "B+=2"]);
        assert_eq!(
            build.package_template_dir,
            vec![PathBuf::from("t1"), PathBuf::from("t2")]
        );
        assert_eq!(build.output_build, PathBuf::from("debian"));
        assert_eq!(build.version.pattern_version, DEFAULT_VERSION_PATTERN);
    }

    #[test]
    fn version_requires_a_file() {
        assert!(Args::try_parse_from(["pkgsmith", "version"]).is_err());
    }

    #[test]
    fn downstream_settings_need_a_reference_file() {
        let args = Args::try_parse_from([
            "pkgsmith", "sync", "-u", "../deploy", "-B", "stable", "-p", "--application-name",
            "proxy",
        ])
        .unwrap();
        let Command::Sync(sync) = args.command else {
            panic!("expected sync");
        };
        assert!(sync.downstream.settings().is_none());

        let args = Args::try_parse_from([
            "pkgsmith",
            "sync",
            "-u",
            "../deploy",
            "--reference-file",
            "versions.env",
            "-B",
            "stable",
            "-p",
            "-y",
        ])
        .unwrap();
        let Command::Sync(sync) = args.command else {
            panic!("expected sync");
        };
        let settings = sync.downstream.settings().unwrap();
        assert_eq!(settings.branch, "stable");
        assert!(!settings.pull);
        assert!(settings.commit);
        assert!(settings.assume_yes);
    }

    #[test]
    fn create_tag_clean_check_is_independent_of_pull() {
        let args =
            Args::try_parse_from(["pkgsmith", "create-tag", "-U", "--no-check-uncommitted"])
                .unwrap();
        let Command::CreateTag(tag) = args.command else {
            panic!("expected create-tag");
        };
        assert!(tag.no_check_uncommitted);
        assert!(!tag.downstream.ignore_change_and_not_pull);
    }

    #[test]
    fn config_format_values() {
        let args =
            Args::try_parse_from(["pkgsmith", "show", "--format", "json", "-s", "X=1"]).unwrap();
        let Command::Config(config) = args.command else {
            panic!("expected config");
        };
        assert_eq!(config.format, ConfigFormat::Json);
    }
}
