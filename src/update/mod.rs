//! Central manifest update engine
//!
//! This module provides:
//! - Package filter configuration from CLI args
//! - Per-run context holding source clients and memoized resolutions
//! - Latest-version selection across package sources
//! - Deprecation migration planning
//! - The engine that applies all of the above to one manifest

mod context;
mod filter;
mod migration;
mod selector;

pub use context::UpdateContext;
pub use filter::UpdateFilter;
pub use migration::{plan_migration, PlannedMigration};
pub use selector::{find_latest, is_eligible, ResolvedVersion};

use crate::domain::{
    ManifestUpdateResult, PackageEntry, PackageSource, PackageVersion, SkipReason, UpdateResult,
};
use crate::error::ManifestError;
use crate::manifest::{load_central, CentralManifest, ManifestWriter};
use crate::propagate::propagate_migrations;
use std::path::Path;
use tracing::{debug, info, warn};

/// Applies version bumps and migrations to a central manifest
pub struct ManifestUpdater<'a> {
    context: &'a UpdateContext,
    filter: UpdateFilter,
    writer: ManifestWriter,
}

impl<'a> ManifestUpdater<'a> {
    /// Create an updater sharing the given run context
    pub fn new(context: &'a UpdateContext, filter: UpdateFilter, writer: ManifestWriter) -> Self {
        Self {
            context,
            filter,
            writer,
        }
    }

    /// Update every eligible entry of the manifest at `path`
    ///
    /// Lookup failures are recorded per entry and never abort the manifest.
    /// When entries were migrated, project files under the manifest's
    /// directory are rewritten to the new identifiers.
    pub async fn update(
        &self,
        path: &Path,
        sources: &[PackageSource],
    ) -> Result<ManifestUpdateResult, ManifestError> {
        let mut manifest = load_central(path)?;
        let mut result = ManifestUpdateResult::new(path);

        let entries: Vec<_> = manifest
            .entries()
            .into_iter()
            .filter(|e| self.filter.should_process_package(&e.id))
            .collect();

        if let Some(ref package) = self.filter.package {
            if !entries.iter().any(|e| !e.pinned) {
                warn!(package = %package, path = %path.display(), "Package {} not found in {}", package, path.display());
                result.filter_missed = Some(package.clone());
                return Ok(result);
            }
        }

        if sources.is_empty() {
            warn!(path = %path.display(), "no enabled package sources, leaving manifest unchanged");
            return Ok(result);
        }

        for entry in &entries {
            let outcome = self.update_entry(&mut manifest, entry, sources).await;
            debug!(package = %entry.id, outcome = %outcome, "processed entry");
            result.add_result(outcome);
        }

        if self.writer.save(path, &manifest)? {
            info!(path = %path.display(), "updated manifest");
        }

        if !result.migrations.is_empty() {
            let root = path.parent().unwrap_or(Path::new("."));
            result.propagated = propagate_migrations(root, &result.migrations, &self.writer);
        }

        Ok(result)
    }

    async fn update_entry(
        &self,
        manifest: &mut CentralManifest,
        entry: &PackageEntry,
        sources: &[PackageSource],
    ) -> UpdateResult {
        if entry.pinned {
            return UpdateResult::skip(&entry.id, &entry.version, SkipReason::Pinned);
        }

        let current = match PackageVersion::parse(&entry.version) {
            Ok(version) => version,
            Err(e) => {
                debug!(package = %entry.id, error = %e, "leaving unparseable version as-is");
                return UpdateResult::skip(
                    &entry.id,
                    &entry.version,
                    SkipReason::InvalidVersion(entry.version.clone()),
                );
            }
        };

        if let Some(planned) = plan_migration(self.context, entry, &current, sources, manifest).await {
            let to_version = planned.version.to_string();
            manifest.set_id(entry, &planned.new_id);
            manifest.set_version(entry, &to_version);
            info!(package = %entry.id, alternate = %planned.new_id, version = %to_version, "migrated deprecated package");
            return UpdateResult::migrate(&entry.id, planned.new_id, &entry.version, to_version);
        }

        match find_latest(self.context, &entry.id, &current, sources).await {
            Ok(Some(resolved)) => {
                let to_version = resolved.version.to_string();
                manifest.set_version(entry, &to_version);
                UpdateResult::update(&entry.id, &entry.version, to_version)
            }
            Ok(None) => UpdateResult::skip(&entry.id, &entry.version, SkipReason::AlreadyLatest),
            Err(e) => {
                warn!(package = %entry.id, error = %e, "failed to resolve latest version");
                UpdateResult::skip(&entry.id, &entry.version, SkipReason::LookupFailed(e.to_string()))
            }
        }
    }
}
