//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-solution display of version bumps, migrations and project updates
//! - Semantic version change type indication (major/minor/patch)
//! - Skipped package display with reasons in verbose mode
//! - Summary line with counts and elapsed time

use super::{format_elapsed, OutputFormatter, Verbosity};
use crate::domain::{PackageVersion, SolutionMode, SolutionResult, UpdateResult, UpdateSummary};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch, revision or label change
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        match (PackageVersion::parse(old), PackageVersion::parse(new)) {
            (Ok(old), Ok(new)) => {
                let (old_major, old_minor) = old.major_minor();
                let (new_major, new_minor) = new.major_minor();
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => self.label().red().bold().to_string(),
            VersionChangeType::Minor => self.label().yellow().to_string(),
            VersionChangeType::Patch => self.label().green().to_string(),
            VersionChangeType::Unknown => self.label().dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
        } else {
            String::new()
        }
    }

    fn change_line(&self, name: &str, from: &str, to: &str, width: usize) -> String {
        let change = VersionChangeType::from_versions(from, to);
        let label = if self.color {
            change.colored_label()
        } else {
            change.label().to_string()
        };
        format!(
            "  {:width$} {} {} {} [{}]",
            name,
            self.paint(from, |s| s.dimmed()),
            self.paint("→", |s| s.dimmed()),
            self.paint(to, |s| s.bright_white().bold()),
            label,
            width = width
        )
    }

    fn write_result(
        &self,
        result: &UpdateResult,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match result {
            UpdateResult::Update { id, from, to } => {
                writeln!(writer, "{}", self.change_line(id, from, to, width))
            }
            UpdateResult::Migrate {
                from_id,
                to_id,
                from_version,
                to_version,
            } => writeln!(
                writer,
                "  {:width$} {} {} {} {} {}",
                from_id,
                self.paint(from_version, |s| s.dimmed()),
                self.paint("→", |s| s.dimmed()),
                self.paint(to_id, |s| s.bright_white().bold()),
                self.paint(to_version, |s| s.bright_white().bold()),
                self.paint("[deprecated]", |s| s.magenta()),
                width = width
            ),
            UpdateResult::Skip { id, reason, .. } => writeln!(
                writer,
                "  {}",
                self.paint(&format!("{:width$} ({})", id, reason, width = width), |s| s
                    .dimmed())
            ),
        }
    }

    fn write_header(
        &self,
        solution: &SolutionResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let path = solution.solution.display().to_string();
        let mode = match solution.mode {
            SolutionMode::Central => "central",
            SolutionMode::Projects => "projects",
            SolutionMode::Excluded => "excluded",
        };
        let changes = solution.change_count();
        writeln!(
            writer,
            "{}{} {} {} {}",
            self.dry_run_prefix(),
            self.paint(&path, |s| s.bold()),
            self.paint(&format!("({})", mode), |s| s.dimmed()),
            self.paint(&changes.to_string(), |s| s.green()),
            if changes == 1 { "change" } else { "changes" }
        )
    }

    fn write_summary(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let elapsed = format_elapsed(Duration::from_millis(summary.elapsed_ms));
        let prefix = self.dry_run_prefix();

        if self.verbosity == Verbosity::Quiet {
            let changes = summary.total_updates() + summary.total_migrations();
            return if changes > 0 {
                writeln!(writer, "{}{} updated", prefix, self.paint(&changes.to_string(), |s| s.green()))
            } else {
                writeln!(writer, "{}{}", prefix, self.paint("No updates", |s| s.dimmed()))
            };
        }

        writeln!(writer, "{}{}:", prefix, self.paint("Summary", |s| s.bold()))?;
        writeln!(
            writer,
            "  {} solution(s), {} failed",
            summary.solutions_found(),
            self.paint(&summary.solutions_failed().to_string(), |s| s.red())
        )?;
        writeln!(
            writer,
            "  {} updated, {} migrated, {} skipped",
            self.paint(&summary.total_updates().to_string(), |s| s.green()),
            self.paint(&summary.total_migrations().to_string(), |s| s.magenta()),
            summary.total_skips()
        )?;
        writeln!(writer, "  finished in {}", elapsed)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            for solution in &summary.solutions {
                self.format_solution(solution, writer)?;
            }
        }
        self.write_summary(summary, writer)
    }

    fn format_solution(
        &self,
        solution: &SolutionResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let verbose = self.verbosity == Verbosity::Verbose;
        let skips = solution.manifest.as_ref().map_or(0, |m| m.skip_count());
        let filter_missed = solution
            .manifest
            .as_ref()
            .and_then(|m| m.filter_missed.as_deref());
        let quiet_solution = solution.change_count() == 0
            && solution.error.is_none()
            && filter_missed.is_none()
            && (!verbose || skips == 0);
        if quiet_solution {
            return Ok(());
        }

        self.write_header(solution, writer)?;

        if let Some(ref manifest) = solution.manifest {
            let shown: Vec<&UpdateResult> = manifest
                .results
                .iter()
                .filter(|r| verbose || r.is_change())
                .collect();
            let width = shown
                .iter()
                .map(|r| r.package_name().len())
                .max()
                .unwrap_or(0)
                .max(20);
            for result in shown {
                self.write_result(result, width, writer)?;
            }
            for project in &manifest.propagated {
                writeln!(
                    writer,
                    "  {} {}",
                    self.paint("rewrote", |s| s.dimmed()),
                    project.display()
                )?;
            }
        }

        let width = solution
            .project_updates
            .iter()
            .map(|u| u.id.len())
            .max()
            .unwrap_or(0)
            .max(20);
        for update in &solution.project_updates {
            writeln!(
                writer,
                "{} {}",
                self.change_line(&update.id, &update.from, &update.to, width),
                self.paint(&format!("({})", update.project.display()), |s| s.dimmed())
            )?;
        }

        if let Some(package) = filter_missed {
            writeln!(
                writer,
                "  {}",
                self.paint(&format!("package {} not found", package), |s| s.yellow())
            )?;
        }

        if let Some(ref error) = solution.error {
            writeln!(
                writer,
                "  {} {}",
                self.paint("✗", |s| s.red()),
                error
            )?;
        }

        writeln!(writer)
    }
}
