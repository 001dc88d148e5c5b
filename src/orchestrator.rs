//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: discover solutions → pick mode → update → build
//! - Central manifest updates through the update engine
//! - Per-project updates through the `dotnet` CLI when no manifest exists
//! - Dry-run mode support
//! - Error handling with per-solution continuation

use crate::cli::CliArgs;
use crate::config::{Excluder, SourceLoader};
use crate::discover::{find_projects, find_solutions};
use crate::domain::{ProjectUpdate, SolutionMode, SolutionResult, UpdateSummary};
use crate::error::{AppError, ConfigError};
use crate::manifest::{ManifestWriter, CENTRAL_MANIFEST_FILE};
use crate::process::{Dotnet, ProcessRunner, SystemRunner};
use crate::registry::{DefaultConnector, HttpClient, SourceConnector};
use crate::update::{ManifestUpdater, UpdateContext, UpdateFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Run-wide settings derived from the command line
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Directory searched for solutions
    pub target: PathBuf,
    /// Single-package restriction
    pub filter: UpdateFilter,
    /// Solution exclusion patterns
    pub excluder: Excluder,
    /// Start a build after each solution
    pub build: bool,
    /// Compute changes without writing
    pub dry_run: bool,
}

impl OrchestratorOptions {
    /// Options for `target` with everything else at defaults
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            filter: UpdateFilter::new(),
            excluder: Excluder::default(),
            build: false,
            dry_run: false,
        }
    }

    /// Build options from CLI arguments and the environment
    pub fn from_cli(args: &CliArgs, current_dir: &Path) -> Self {
        Self {
            target: args.target_directory(current_dir),
            filter: UpdateFilter::new().with_package(args.package.clone()),
            excluder: Excluder::from_env().with_patterns(&args.ignore),
            build: args.build,
            dry_run: args.dry_run,
        }
    }
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    options: OrchestratorOptions,
    context: UpdateContext,
    runner: Arc<dyn ProcessRunner>,
    sources: SourceLoader,
}

impl Orchestrator {
    /// Create an orchestrator talking to real package sources and processes
    pub fn new(options: OrchestratorOptions) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        Ok(Self::with_parts(
            options,
            Arc::new(DefaultConnector::new(client)),
            Arc::new(SystemRunner::new()),
            SourceLoader::new(),
        ))
    }

    /// Create an orchestrator from explicit collaborators
    pub fn with_parts(
        options: OrchestratorOptions,
        connector: Arc<dyn SourceConnector>,
        runner: Arc<dyn ProcessRunner>,
        sources: SourceLoader,
    ) -> Self {
        Self {
            options,
            context: UpdateContext::new(connector),
            runner,
            sources,
        }
    }

    /// Process every solution under the target directory
    ///
    /// Only a missing target directory is an error; failures inside a
    /// solution are recorded on its result and the run continues.
    pub async fn run(&self) -> Result<UpdateSummary, ConfigError> {
        let started = Instant::now();
        let target = &self.options.target;
        if !target.is_dir() {
            return Err(ConfigError::MissingTarget {
                path: target.clone(),
            });
        }

        info!(path = %target.display(), package = ?self.options.filter.package, "scanning for solutions");
        let mut summary = UpdateSummary::new(self.options.dry_run);

        for solution in find_solutions(target) {
            let result = self.process_solution(&solution).await;
            if let Some(ref e) = result.error {
                error!(solution = %solution.display(), error = %e, "failed to process solution");
            }
            summary.add_solution(result);
        }

        if summary.solutions.iter().any(|s| s.build_started) {
            if let Err(e) = Dotnet::new(self.runner.as_ref())
                .shutdown_build_server(target)
                .await
            {
                warn!(error = %e, "failed to shut down build server");
            }
        }

        summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(summary)
    }

    async fn process_solution(&self, solution: &Path) -> SolutionResult {
        if self
            .options
            .excluder
            .should_exclude(&solution.to_string_lossy())
        {
            info!(solution = %solution.display(), "excluded");
            return SolutionResult::new(solution, SolutionMode::Excluded);
        }

        let directory = solution.parent().unwrap_or(Path::new("."));
        let manifest = directory.join(CENTRAL_MANIFEST_FILE);
        let mode = if manifest.is_file() {
            SolutionMode::Central
        } else {
            SolutionMode::Projects
        };
        info!(solution = %solution.display(), mode = ?mode, "processing solution");

        let mut result = SolutionResult::new(solution, mode);
        let outcome = match mode {
            SolutionMode::Central => self.update_central(&manifest, directory, &mut result).await,
            _ => self.update_projects(directory, &mut result).await,
        };
        if let Err(e) = outcome {
            result.error = Some(e.to_string());
            return result;
        }

        if self.options.build && !self.options.dry_run {
            match Dotnet::new(self.runner.as_ref()).build(solution).await {
                Ok(()) => result.build_started = true,
                Err(e) => result.error = Some(e.to_string()),
            }
        }
        result
    }

    async fn update_central(
        &self,
        manifest: &Path,
        directory: &Path,
        result: &mut SolutionResult,
    ) -> Result<(), AppError> {
        let sources = self.sources.enabled_sources(directory)?;
        let updater = ManifestUpdater::new(
            &self.context,
            self.options.filter.clone(),
            ManifestWriter::new(self.options.dry_run),
        );
        result.manifest = Some(updater.update(manifest, &sources).await?);
        Ok(())
    }

    async fn update_projects(
        &self,
        directory: &Path,
        result: &mut SolutionResult,
    ) -> Result<(), AppError> {
        let dotnet = Dotnet::new(self.runner.as_ref());
        for project in find_projects(directory) {
            let pending = dotnet.list_outdated(&project).await?;
            for update in pending
                .into_iter()
                .filter(|u| self.options.filter.should_process_package(&u.package))
            {
                if !self.options.dry_run {
                    dotnet
                        .add_package(&project, &update.package, &update.latest)
                        .await?;
                }
                result.project_updates.push(ProjectUpdate {
                    project: project.clone(),
                    id: update.package,
                    from: update.resolved,
                    to: update.latest,
                });
            }
        }
        Ok(())
    }
}
