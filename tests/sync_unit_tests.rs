//! Unit tests for the downstream repository sync

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use pkgsmith::error::PackagerError;
    use pkgsmith::git::MockGit;
    use pkgsmith::operations::sync::{DownstreamSync, sync_downstream};
    use pkgsmith::system::System as _;
    use pkgsmith::system::mock::MockSystem;
    use std::path::{Path, PathBuf};

    const REFERENCE: &str = "/deploy/group_vars/all.yml";

    fn downstream() -> MockSystem {
        MockSystem::new()
            .with_file(
                REFERENCE,
                b"proxy_version = \"9.1.33\"\nproxy_tag = \"9.1.33\"\n",
            )
            .unwrap()
    }

    fn settings() -> DownstreamSync {
        DownstreamSync {
            repository_name: "downstream".to_owned(),
            branch: "stable".to_owned(),
            reference_file: PathBuf::from("group_vars/all.yml"),
            pattern: None,
            application_name: Some("proxy".to_owned()),
            pull: true,
            commit: true,
            push: true,
            assume_yes: false,
        }
    }

    fn reference(system: &MockSystem) -> String {
        system.read_to_string(Path::new(REFERENCE)).unwrap()
    }

    #[test]
    fn confirmed_sync_updates_commits_and_pushes() {
        let system = downstream()
            .with_answer(true)
            .unwrap()
            .with_answer(true)
            .unwrap();
        let git = MockGit::new("/deploy");

        let report = sync_downstream(&system, &git, &settings(), "9.1.34").unwrap();

        assert_eq!(report.previous_version, "9.1.33");
        assert!(report.committed);
        // Only the first match is rewritten
        assert_eq!(
            reference(&system),
            "proxy_version = \"9.1.33\"\nproxy_tag = \"9.1.33\"\n".replacen("9.1.33", "9.1.34", 1)
        );
        assert_eq!(
            system.questions().unwrap(),
            vec![
                "Use \"stable\" branch for \"downstream\" ?",
                "git push origin \"stable\" on \"downstream\" repository ?",
            ]
        );
        assert_eq!(
            git.calls(),
            vec![
                "git fetch --tags --all",
                "git switch stable",
                "git pull origin stable --rebase",
                "git commit -am proxy updated to 9.1.34",
                "git push origin stable",
            ]
        );
    }

    #[test]
    fn declined_confirmation_cancels_without_changes() {
        let system = downstream().with_answer(false).unwrap();
        let git = MockGit::new("/deploy");

        let err = sync_downstream(&system, &git, &settings(), "9.1.34").unwrap_err();

        let err = err.downcast::<PackagerError>().unwrap();
        assert!(matches!(err, PackagerError::Cancelled { .. }));
        assert!(git.calls().is_empty());
        assert!(reference(&system).contains("9.1.33"));
    }

    #[test]
    fn declined_push_still_commits() {
        let system = downstream()
            .with_answer(true)
            .unwrap()
            .with_answer(false)
            .unwrap();
        let git = MockGit::new("/deploy");

        sync_downstream(&system, &git, &settings(), "9.1.34").unwrap();

        assert_eq!(
            git.calls().last().unwrap(),
            "git commit -am proxy updated to 9.1.34"
        );
    }

    #[test]
    fn no_pull_no_commit() {
        let system = downstream();
        let git = MockGit::new("/deploy");
        let settings = DownstreamSync {
            pull: false,
            commit: false,
            assume_yes: true,
            ..settings()
        };

        let report = sync_downstream(&system, &git, &settings, "10.0.0").unwrap();

        assert!(!report.committed);
        assert!(reference(&system).starts_with("proxy_version = \"10.0.0\""));
        assert_eq!(git.calls(), vec!["git fetch --tags --all", "git switch stable"]);
    }

    #[test]
    fn explicit_reference_pattern_wins() {
        let system = downstream();
        let git = MockGit::new("/deploy");
        let settings = DownstreamSync {
            pattern: Some(r#"proxy_tag = "([^"]*)""#.to_owned()),
            commit: false,
            assume_yes: true,
            ..settings()
        };

        sync_downstream(&system, &git, &settings, "9.1.40").unwrap();

        assert_eq!(
            reference(&system),
            "proxy_version = \"9.1.33\"\nproxy_tag = \"9.1.40\"\n"
        );
    }

    #[test]
    fn missing_pattern_and_name_is_a_configuration_error() {
        let system = downstream();
        let git = MockGit::new("/deploy");
        let settings = DownstreamSync {
            application_name: None,
            assume_yes: true,
            ..settings()
        };

        let err = sync_downstream(&system, &git, &settings, "9.1.34").unwrap_err();

        assert_eq!(err.downcast::<PackagerError>().unwrap().exit_code(), 1);
        assert!(git.calls().is_empty());
    }

    #[test]
    fn reference_not_found() {
        let system = MockSystem::new()
            .with_file(REFERENCE, b"nothing: here\n")
            .unwrap();
        let git = MockGit::new("/deploy");
        let settings = DownstreamSync {
            assume_yes: true,
            ..settings()
        };

        let err = sync_downstream(&system, &git, &settings, "9.1.34").unwrap_err();

        let err = err.downcast::<PackagerError>().unwrap();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains(REFERENCE));
    }
}
