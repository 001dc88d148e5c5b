//! `dotnet` commands used while processing solutions

use super::{parse_with_updates, Invocation, PendingUpdate, ProcessRunner};
use crate::error::ProcessError;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const DOTNET: &str = "dotnet";

/// Budget for `dotnet list package --outdated`
pub const LIST_TIMEOUT: Duration = Duration::from_secs(100);

/// Budget for `dotnet add package`
pub const ADD_TIMEOUT: Duration = Duration::from_secs(60);

/// Budget for `dotnet build-server shutdown`
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(20);

/// Typed front end over a [`ProcessRunner`]
pub struct Dotnet<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> Dotnet<'a> {
    /// Wrap a runner
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Start `dotnet build` for a solution without waiting for it
    pub async fn build(&self, solution: &Path) -> Result<(), ProcessError> {
        info!(solution = %solution.display(), "starting build");
        let invocation = Invocation::new(
            DOTNET,
            [
                "build".to_string(),
                solution.display().to_string(),
                "--no-restore".to_string(),
                "--nologo".to_string(),
            ],
            parent_of(solution),
            Duration::ZERO,
        );
        self.runner.run(&invocation).await.map(|_| ())
    }

    /// Stop the shared build servers started by earlier builds
    pub async fn shutdown_build_server(&self, directory: &Path) -> Result<(), ProcessError> {
        info!("shutting down dotnet build server");
        let invocation = Invocation::new(
            DOTNET,
            ["build-server", "shutdown"],
            directory,
            SHUTDOWN_TIMEOUT,
        );
        self.runner.run(&invocation).await.map(|_| ())
    }

    /// Outdated packages of a project that are safe to apply
    pub async fn list_outdated(&self, project: &Path) -> Result<Vec<PendingUpdate>, ProcessError> {
        let invocation = Invocation::new(
            DOTNET,
            [
                "list".to_string(),
                project.display().to_string(),
                "package".to_string(),
                "--outdated".to_string(),
            ],
            parent_of(project),
            LIST_TIMEOUT,
        );
        let lines = self.runner.run(&invocation).await?;
        Ok(parse_with_updates(lines.iter().map(String::as_str)))
    }

    /// Reference `id` at `version` from a project
    pub async fn add_package(&self, project: &Path, id: &str, version: &str) -> Result<(), ProcessError> {
        info!(project = %project.display(), package = id, version, "updating package");
        let invocation = Invocation::new(
            DOTNET,
            [
                "add".to_string(),
                project.display().to_string(),
                "package".to_string(),
                id.to_string(),
                "--version".to_string(),
                version.to_string(),
            ],
            parent_of(project),
            ADD_TIMEOUT,
        );
        self.runner.run(&invocation).await.map(|_| ())
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockRunner;

    #[tokio::test]
    async fn test_build_is_fire_and_forget_in_solution_dir() {
        let runner = MockRunner::new();
        Dotnet::new(&runner)
            .build(Path::new("/repo/src/App.sln"))
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].to_string(), "dotnet build /repo/src/App.sln --no-restore --nologo");
        assert_eq!(calls[0].directory, Path::new("/repo/src"));
        assert!(calls[0].is_fire_and_forget());
    }

    #[tokio::test]
    async fn test_list_outdated_parses_output() {
        let runner = MockRunner::new().respond(
            "list",
            &[
                "   > Foo    1.0.0    1.0.0    1.1.0",
                "   > Bar    2.0.0    2.0.0    3.0.0-rc.1",
            ],
        );
        let updates = Dotnet::new(&runner)
            .list_outdated(Path::new("/repo/App/App.csproj"))
            .await
            .unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].package, "Foo");
        let calls = runner.calls();
        assert_eq!(calls[0].to_string(), "dotnet list /repo/App/App.csproj package --outdated");
        assert_eq!(calls[0].directory, Path::new("/repo/App"));
        assert_eq!(calls[0].timeout, LIST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_add_package_and_shutdown_commands() {
        let runner = MockRunner::new();
        let dotnet = Dotnet::new(&runner);
        dotnet
            .add_package(Path::new("/repo/App/App.csproj"), "Foo", "1.1.0")
            .await
            .unwrap();
        dotnet.shutdown_build_server(Path::new("/repo")).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "dotnet add /repo/App/App.csproj package Foo --version 1.1.0",
                "dotnet build-server shutdown",
            ]
        );
        assert_eq!(runner.calls()[1].timeout, SHUTDOWN_TIMEOUT);
    }

    #[tokio::test]
    async fn test_failures_are_propagated() {
        let runner = MockRunner::new().fail("list", "restore failed");
        let err = Dotnet::new(&runner)
            .list_outdated(Path::new("/repo/App/App.csproj"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::NonZeroExit { .. }));
    }
}
