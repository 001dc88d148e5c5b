//! Integration tests for cpmup
//!
//! These tests verify:
//! - Solution discovery and mode selection
//! - Central manifest updates against a local folder feed
//! - Formatting preservation, pinning, filtering and dry-run

use cpmup::config::{Excluder, SourceLoader};
use cpmup::domain::{SkipReason, SolutionMode, UpdateResult};
use cpmup::error::ConfigError;
use cpmup::manifest::load_central;
use cpmup::orchestrator::{Orchestrator, OrchestratorOptions};
use cpmup::process::SystemRunner;
use cpmup::registry::{DefaultConnector, HttpClient};
use cpmup::update::UpdateFilter;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create `{feed}/{id}/{version}/` folders
fn publish(feed: &Path, id: &str, versions: &[&str]) {
    for version in versions {
        fs::create_dir_all(feed.join(id.to_lowercase()).join(version)).unwrap();
    }
}

/// Solution directory whose only package source is `feed`
fn create_solution(root: &Path, name: &str, feed: &Path, manifest: Option<&str>) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.sln", name)), "").unwrap();
    fs::write(
        dir.join("nuget.config"),
        format!(
            "<configuration>\n  <packageSources>\n    <clear />\n    <add key=\"local\" value=\"{}\" />\n  </packageSources>\n</configuration>\n",
            feed.display()
        ),
    )
    .unwrap();
    if let Some(content) = manifest {
        fs::write(dir.join("Directory.Packages.props"), content).unwrap();
    }
}

fn orchestrator(options: OrchestratorOptions) -> Orchestrator {
    let client = HttpClient::new().unwrap();
    Orchestrator::with_parts(
        options,
        Arc::new(DefaultConnector::new(client)),
        Arc::new(SystemRunner::new()),
        SourceLoader::with_user_config(None),
    )
}

fn feed(root: &Path) -> std::path::PathBuf {
    let feed = root.join("feed");
    publish(&feed, "Newtonsoft.Json", &["12.0.3", "13.0.1", "13.0.3", "14.0.0-beta1"]);
    publish(&feed, "Serilog", &["2.10.0", "3.0.0-rc.1", "3.1.0-preview"]);
    publish(&feed, "Polly", &["7.0.0", "8.2.0"]);
    feed
}

mod central_updates {
    use super::*;

    const MANIFEST: &str = "<Project>\r\n  <ItemGroup>\r\n    <PackageVersion Include=\"Newtonsoft.Json\" Version=\"12.0.3\" />\r\n    <PackageVersion Include=\"serilog\" Version=\"3.0.0-rc.1\" />\r\n    <PackageVersion Include=\"Polly\" Version=\"7.0.0\" Pinned=\"true\" />\r\n  </ItemGroup>\r\n</Project>";

    #[tokio::test]
    async fn test_updates_central_manifest_in_place() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        create_solution(temp.path(), "App", &feed, Some(MANIFEST));

        let summary = orchestrator(OrchestratorOptions::new(temp.path()))
            .run()
            .await
            .unwrap();

        assert_eq!(summary.solutions_found(), 1);
        let solution = &summary.solutions[0];
        assert_eq!(solution.mode, SolutionMode::Central);
        assert!(solution.error.is_none());

        let manifest = solution.manifest.as_ref().unwrap();
        assert_eq!(
            manifest.results[0],
            UpdateResult::update("Newtonsoft.Json", "12.0.3", "13.0.3")
        );
        assert_eq!(
            manifest.results[1],
            UpdateResult::update("serilog", "3.0.0-rc.1", "3.1.0-preview")
        );
        assert_eq!(
            manifest.results[2],
            UpdateResult::skip("Polly", "7.0.0", SkipReason::Pinned)
        );

        let written = fs::read_to_string(temp.path().join("App/Directory.Packages.props")).unwrap();
        let expected = MANIFEST
            .replace("\"12.0.3\"", "\"13.0.3\"")
            .replace("\"3.0.0-rc.1\"", "\"3.1.0-preview\"");
        assert_eq!(written, expected);
        assert!(!written.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_manifest_untouched() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        create_solution(temp.path(), "App", &feed, Some(MANIFEST));

        let mut options = OrchestratorOptions::new(temp.path());
        options.dry_run = true;
        let summary = orchestrator(options).run().await.unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.total_updates(), 2);
        let written = fs::read_to_string(temp.path().join("App/Directory.Packages.props")).unwrap();
        assert_eq!(written, MANIFEST);
    }

    #[tokio::test]
    async fn test_package_filter_limits_changes() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        create_solution(temp.path(), "App", &feed, Some(MANIFEST));

        let mut options = OrchestratorOptions::new(temp.path());
        options.filter = UpdateFilter::new().with_package(Some("NEWTONSOFT.JSON"));
        let summary = orchestrator(options).run().await.unwrap();

        assert_eq!(summary.total_updates(), 1);
        let manifest = load_central(&temp.path().join("App/Directory.Packages.props")).unwrap();
        let versions: Vec<String> = manifest.entries().into_iter().map(|e| e.version).collect();
        assert_eq!(versions, vec!["13.0.3", "3.0.0-rc.1", "7.0.0"]);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        create_solution(temp.path(), "App", &feed, Some(MANIFEST));

        orchestrator(OrchestratorOptions::new(temp.path())).run().await.unwrap();
        let after_first = fs::read(temp.path().join("App/Directory.Packages.props")).unwrap();

        let summary = orchestrator(OrchestratorOptions::new(temp.path()))
            .run()
            .await
            .unwrap();
        assert!(!summary.has_changes());
        let after_second = fs::read(temp.path().join("App/Directory.Packages.props")).unwrap();
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_unknown_package_is_already_latest() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        let manifest = "<Project>\n  <ItemGroup>\n    <PackageVersion Include=\"Internal.Only\" Version=\"1.0.0\" />\n  </ItemGroup>\n</Project>\n";
        create_solution(temp.path(), "App", &feed, Some(manifest));

        let summary = orchestrator(OrchestratorOptions::new(temp.path()))
            .run()
            .await
            .unwrap();

        let result = &summary.solutions[0].manifest.as_ref().unwrap().results[0];
        assert_eq!(
            *result,
            UpdateResult::skip("Internal.Only", "1.0.0", SkipReason::AlreadyLatest)
        );
        assert!(!summary.solutions[0].manifest.as_ref().unwrap().modified);
    }
}

mod orchestration {
    use super::*;

    #[tokio::test]
    async fn test_missing_target_is_an_error() {
        let temp = create_test_dir();
        let err = orchestrator(OrchestratorOptions::new(temp.path().join("missing")))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingTarget { .. }));
    }

    #[tokio::test]
    async fn test_excluded_solution_is_not_touched() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        let manifest = "<Project>\n  <ItemGroup>\n    <PackageVersion Include=\"Polly\" Version=\"7.0.0\" />\n  </ItemGroup>\n</Project>\n";
        create_solution(temp.path(), "Legacy", &feed, Some(manifest));
        create_solution(temp.path(), "Modern", &feed, Some(manifest));

        let mut options = OrchestratorOptions::new(temp.path());
        options.excluder = Excluder::new(["legacy"]);
        let summary = orchestrator(options).run().await.unwrap();

        assert_eq!(summary.solutions_found(), 2);
        assert_eq!(summary.solutions[0].mode, SolutionMode::Excluded);
        assert_eq!(summary.solutions[1].mode, SolutionMode::Central);
        assert_eq!(summary.total_updates(), 1);

        let legacy = fs::read_to_string(temp.path().join("Legacy/Directory.Packages.props")).unwrap();
        assert_eq!(legacy, manifest);
    }

    #[tokio::test]
    async fn test_broken_manifest_does_not_stop_the_run() {
        let temp = create_test_dir();
        let feed = feed(temp.path());
        create_solution(temp.path(), "Broken", &feed, Some("<Project>\n  <PackageVersion Include=\"Polly\" Version=\"7.0.0\"\n"));
        create_solution(
            temp.path(),
            "Good",
            &feed,
            Some("<Project>\n  <ItemGroup>\n    <PackageVersion Include=\"Polly\" Version=\"7.0.0\" />\n  </ItemGroup>\n</Project>\n"),
        );

        let summary = orchestrator(OrchestratorOptions::new(temp.path()))
            .run()
            .await
            .unwrap();

        assert_eq!(summary.solutions_failed(), 1);
        assert!(summary.solutions[0].is_failed());
        assert_eq!(summary.total_updates(), 1);
    }
}
