//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run summary
//! - Structured solution-by-solution change/skip information

use crate::domain::{SkipReason, SolutionMode, SolutionResult, UpdateResult, UpdateSummary};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full run
#[derive(Serialize)]
struct JsonOutput {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-solution results
    solutions: Vec<JsonSolution>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    solutions: usize,
    failed: usize,
    updates: usize,
    migrations: usize,
    skips: usize,
    elapsed_ms: u64,
}

/// JSON representation of a solution result
#[derive(Serialize)]
struct JsonSolution {
    /// Path to the solution file
    path: String,
    /// Processing mode
    mode: &'static str,
    /// Central manifest, when one was processed
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<String>,
    /// Version bumps (central and per-project)
    updates: Vec<JsonUpdate>,
    /// Package replacements
    #[serde(skip_serializing_if = "Vec::is_empty")]
    migrations: Vec<JsonMigration>,
    /// Projects rewritten after migrations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    propagated: Vec<String>,
    /// List of skips (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
    /// Package filter that matched nothing in the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_missed: Option<String>,
    build_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// JSON representation of a version bump
#[derive(Serialize)]
struct JsonUpdate {
    /// Package id
    name: String,
    /// Old version
    from: String,
    /// New version
    to: String,
    /// Project file, for updates applied per project
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<String>,
}

#[derive(Serialize)]
struct JsonMigration {
    from: String,
    to: String,
    from_version: String,
    to_version: String,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    /// Package id
    name: String,
    /// Current version
    version: String,
    /// Skip reason
    reason: String,
}

impl JsonFormatter {
    /// Convert skip reason to string
    fn skip_reason_to_string(reason: &SkipReason) -> String {
        match reason {
            SkipReason::Pinned => "pinned".to_string(),
            SkipReason::AlreadyLatest => "already_latest".to_string(),
            SkipReason::InvalidVersion(msg) => format!("invalid_version: {}", msg),
            SkipReason::LookupFailed(msg) => format!("lookup_failed: {}", msg),
        }
    }

    /// Convert solution result to JSON representation
    fn solution_to_json(&self, solution: &SolutionResult) -> JsonSolution {
        let mut updates = Vec::new();
        let mut migrations = Vec::new();
        let mut skips = Vec::new();

        let results = solution.manifest.iter().flat_map(|m| m.results.iter());
        for result in results {
            match result {
                UpdateResult::Update { id, from, to } => updates.push(JsonUpdate {
                    name: id.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    project: None,
                }),
                UpdateResult::Migrate {
                    from_id,
                    to_id,
                    from_version,
                    to_version,
                } => migrations.push(JsonMigration {
                    from: from_id.clone(),
                    to: to_id.clone(),
                    from_version: from_version.clone(),
                    to_version: to_version.clone(),
                }),
                UpdateResult::Skip {
                    id,
                    version,
                    reason,
                } if self.verbosity == Verbosity::Verbose => skips.push(JsonSkip {
                    name: id.clone(),
                    version: version.clone(),
                    reason: Self::skip_reason_to_string(reason),
                }),
                UpdateResult::Skip { .. } => {}
            }
        }

        updates.extend(solution.project_updates.iter().map(|u| JsonUpdate {
            name: u.id.clone(),
            from: u.from.clone(),
            to: u.to.clone(),
            project: Some(u.project.display().to_string()),
        }));

        JsonSolution {
            path: solution.solution.display().to_string(),
            mode: match solution.mode {
                SolutionMode::Central => "central",
                SolutionMode::Projects => "projects",
                SolutionMode::Excluded => "excluded",
            },
            manifest: solution
                .manifest
                .as_ref()
                .map(|m| m.path.display().to_string()),
            updates,
            migrations,
            propagated: solution
                .manifest
                .iter()
                .flat_map(|m| m.propagated.iter())
                .map(|p| p.display().to_string())
                .collect(),
            skips,
            filter_missed: solution
                .manifest
                .as_ref()
                .and_then(|m| m.filter_missed.clone()),
            build_started: solution.build_started,
            error: solution.error.clone(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let solutions = if self.verbosity == Verbosity::Quiet {
            Vec::new()
        } else {
            summary
                .solutions
                .iter()
                .map(|s| self.solution_to_json(s))
                .collect()
        };

        let output = JsonOutput {
            dry_run: summary.dry_run,
            summary: JsonSummary {
                solutions: summary.solutions_found(),
                failed: summary.solutions_failed(),
                updates: summary.total_updates(),
                migrations: summary.total_migrations(),
                skips: summary.total_skips(),
                elapsed_ms: summary.elapsed_ms,
            },
            solutions,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_solution(
        &self,
        solution: &SolutionResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = self.solution_to_json(solution);

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
