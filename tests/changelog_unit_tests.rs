//! Unit tests for changelog updates

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use chrono::{DateTime, TimeZone as _, Utc};
    use clap::Parser as _;
    use pkgsmith::cli::{Args, ChangelogArgs, Command, execute_changelog};
    use pkgsmith::error::PackagerError;
    use pkgsmith::operations::changelog::StaticSource;
    use pkgsmith::system::System as _;
    use pkgsmith::system::mock::MockSystem;
    use std::path::{Path, PathBuf};

    const CHANGELOG: &str = "/proj/packaging/template/debian/changelog";

    fn parse(args: &[&str]) -> ChangelogArgs {
        let mut argv = vec!["pkgsmith", "changelog"];
        argv.extend_from_slice(args);
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Command::Changelog(changelog) => changelog,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 4, 9).unwrap()
    }

    fn project() -> MockSystem {
        MockSystem::new()
            .with_current_dir("/proj")
            .unwrap()
            .with_file("/proj/setup.py", b"version='9.1.34'\n")
            .unwrap()
            .with_file(CHANGELOG, b"proxy (9.1.33) unstable; urgency=low\n")
            .unwrap()
    }

    #[test]
    fn entry_is_prepended_with_version_from_file() {
        let system = project();
        let args = parse(&["-V", "setup.py", "-n", "proxy", "--utc", "0000"]);

        let updated = execute_changelog(
            &system,
            &StaticSource("Fix the proxy timeout\n\nBump dependencies".to_owned()),
            &args,
            now(),
        )
        .unwrap();

        assert_eq!(updated, vec![PathBuf::from(CHANGELOG)]);
        assert_eq!(
            system.read_to_string(Path::new(CHANGELOG)).unwrap(),
            "proxy (9.1.34%TARGET_NAME%) %PKG_DISTRIBUTION%; urgency=low\n\n\
             \x20 * Fix the proxy timeout\n\
             \x20 * Bump dependencies\n\n\n \
             -- Packaging Team <packaging@localhost>  Tue, 05 Mar 2024 10:04:09 +0000\n\n\
             proxy (9.1.33) unstable; urgency=low\n"
        );
    }

    #[test]
    fn directories_without_changelog_are_skipped() {
        let system = project().with_dir("/proj/packaging/extra").unwrap();
        let args = parse(&[
            "--project-version",
            "9.2.0",
            "-d",
            "packaging/extra",
            "packaging/template/debian",
        ]);

        let updated =
            execute_changelog(&system, &StaticSource("Release".to_owned()), &args, now()).unwrap();

        assert_eq!(updated, vec![PathBuf::from(CHANGELOG)]);
        assert!(
            system
                .read_to_string(Path::new(CHANGELOG))
                .unwrap()
                .starts_with("%PROJECT_NAME% (9.2.0%TARGET_NAME%)")
        );
    }

    #[test]
    fn unknown_version_is_a_configuration_error() {
        let system = project();
        let args = parse(&[]);

        let err =
            execute_changelog(&system, &StaticSource("x".to_owned()), &args, now()).unwrap_err();

        assert_eq!(err.downcast::<PackagerError>().unwrap().exit_code(), 1);
        assert_eq!(
            system.read_to_string(Path::new(CHANGELOG)).unwrap(),
            "proxy (9.1.33) unstable; urgency=low\n"
        );
    }

    #[test]
    fn empty_message_leaves_the_changelog_untouched() {
        let system = project();
        let args = parse(&["-V", "setup.py"]);

        let err = execute_changelog(&system, &StaticSource("\n  \n".to_owned()), &args, now())
            .unwrap_err();

        assert!(err.to_string().contains("empty"));
        assert!(
            system
                .read_to_string(Path::new(CHANGELOG))
                .unwrap()
                .starts_with("proxy (9.1.33)")
        );
    }
}
