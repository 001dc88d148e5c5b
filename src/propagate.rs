//! Rewrites package references in project files after manifest migrations

use crate::discover::find_projects;
use crate::domain::Migration;
use crate::manifest::{load_project, ManifestWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Apply identifier migrations to every project file under `root`
///
/// Returns the project files that changed (or would change in a dry run).
/// Files without a matching reference are never rewritten, and a project
/// that cannot be read or saved is logged and skipped.
pub fn propagate_migrations(
    root: &Path,
    migrations: &[Migration],
    writer: &ManifestWriter,
) -> Vec<PathBuf> {
    if migrations.is_empty() {
        return Vec::new();
    }

    let mut changed = Vec::new();
    for path in find_projects(root) {
        let mut project = match load_project(&path) {
            Ok(project) => project,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable project file");
                continue;
            }
        };

        let renamed: usize = migrations
            .iter()
            .map(|m| project.rename_references(&m.old_id, &m.new_id))
            .sum();
        if renamed == 0 {
            continue;
        }

        match writer.save(&path, &project) {
            Ok(_) => {
                info!(path = %path.display(), references = renamed, "updated package references");
                changed.push(path);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save project file"),
        }
    }
    changed
}
