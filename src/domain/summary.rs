//! Update result summary types
//!
//! Provides structures for tracking results at manifest, solution and run level.

use super::{Migration, UpdateResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Update result for a single central manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestUpdateResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Individual entry results, in document order
    pub results: Vec<UpdateResult>,
    /// Identity migrations performed in this manifest
    pub migrations: Vec<Migration>,
    /// Whether the document content changed
    pub modified: bool,
    /// Project files whose references were rewritten
    pub propagated: Vec<PathBuf>,
    /// Package filter that matched no updatable entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_missed: Option<String>,
}

impl ManifestUpdateResult {
    /// Creates a new ManifestUpdateResult
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            results: Vec::new(),
            migrations: Vec::new(),
            modified: false,
            propagated: Vec::new(),
            filter_missed: None,
        }
    }

    /// Adds an entry result
    pub fn add_result(&mut self, result: UpdateResult) {
        if result.is_change() {
            self.modified = true;
        }
        if let UpdateResult::Migrate { from_id, to_id, .. } = &result {
            self.migrations.push(Migration::new(from_id.clone(), to_id.clone()));
        }
        self.results.push(result);
    }

    /// Returns the number of version bumps
    pub fn update_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_update()).count()
    }

    /// Returns the number of migrations
    pub fn migration_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_migration()).count()
    }

    /// Returns the number of skips
    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skip()).count()
    }

    /// Returns all changed entries
    pub fn changes(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_change())
    }

    /// Returns all skips
    pub fn skips(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_skip())
    }
}

/// A package update applied to a project through the external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    /// Project file
    pub project: PathBuf,
    /// Package identifier
    pub id: String,
    /// Resolved version before the update
    pub from: String,
    /// Version requested from the tool
    pub to: String,
}

/// How a solution was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionMode {
    /// A central manifest was updated in place
    Central,
    /// Project files were updated through the external tool
    Projects,
    /// Matched an ignore pattern
    Excluded,
}

/// Result for one solution file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionResult {
    /// Path to the solution file
    pub solution: PathBuf,
    /// Processing mode
    pub mode: SolutionMode,
    /// Central manifest result, in central mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestUpdateResult>,
    /// Applied updates, in project mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_updates: Vec<ProjectUpdate>,
    /// Whether a build was started
    pub build_started: bool,
    /// Failure that stopped processing of this solution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolutionResult {
    /// Creates an empty result for the given mode
    pub fn new(solution: impl Into<PathBuf>, mode: SolutionMode) -> Self {
        Self {
            solution: solution.into(),
            mode,
            manifest: None,
            project_updates: Vec::new(),
            build_started: false,
            error: None,
        }
    }

    /// Number of changes applied (bumps, migrations, project updates)
    pub fn change_count(&self) -> usize {
        let central = self
            .manifest
            .as_ref()
            .map(|m| m.update_count() + m.migration_count())
            .unwrap_or(0);
        central + self.project_updates.len()
    }

    /// Returns true if processing failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Overall summary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Results for each solution processed
    pub solutions: Vec<SolutionResult>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl UpdateSummary {
    /// Creates a new UpdateSummary
    pub fn new(dry_run: bool) -> Self {
        Self {
            solutions: Vec::new(),
            dry_run,
            elapsed_ms: 0,
        }
    }

    /// Adds a solution result
    pub fn add_solution(&mut self, solution: SolutionResult) {
        self.solutions.push(solution);
    }

    /// Returns the number of solutions found
    pub fn solutions_found(&self) -> usize {
        self.solutions.len()
    }

    /// Returns the number of solutions that failed
    pub fn solutions_failed(&self) -> usize {
        self.solutions.iter().filter(|s| s.is_failed()).count()
    }

    /// Returns the total number of version bumps across all solutions
    pub fn total_updates(&self) -> usize {
        self.manifests().map(|m| m.update_count()).sum::<usize>()
            + self
                .solutions
                .iter()
                .map(|s| s.project_updates.len())
                .sum::<usize>()
    }

    /// Returns the total number of migrations
    pub fn total_migrations(&self) -> usize {
        self.manifests().map(|m| m.migration_count()).sum()
    }

    /// Returns the total number of skipped entries
    pub fn total_skips(&self) -> usize {
        self.manifests().map(|m| m.skip_count()).sum()
    }

    /// Returns true if anything changed
    pub fn has_changes(&self) -> bool {
        self.solutions.iter().any(|s| s.change_count() > 0)
    }

    /// Returns all central manifest results
    pub fn manifests(&self) -> impl Iterator<Item = &ManifestUpdateResult> {
        self.solutions.iter().filter_map(|s| s.manifest.as_ref())
    }
}

impl Default for UpdateSummary {
    fn default() -> Self {
        Self::new(false)
    }
}
