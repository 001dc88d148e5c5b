//! Replacement of deprecated packages by their suggested alternates

use super::{find_latest, UpdateContext};
use crate::domain::{PackageEntry, PackageMetadata, PackageSource, PackageVersion};
use crate::manifest::CentralManifest;
use tracing::{debug, warn};

/// A migration that is safe to apply to a manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMigration {
    /// Identifier of the alternate package
    pub new_id: String,
    /// Version to pin the alternate at, never `0.0.0`
    pub version: PackageVersion,
}

/// Decide whether `entry` should be replaced by its deprecation alternate
///
/// Returns `None` whenever the entry should go through the ordinary version
/// bump instead: no metadata, not deprecated, no alternate, the alternate is
/// already declared, or it cannot be resolved in any source.
pub async fn plan_migration(
    context: &UpdateContext,
    entry: &PackageEntry,
    current: &PackageVersion,
    sources: &[PackageSource],
    manifest: &CentralManifest,
) -> Option<PlannedMigration> {
    let metadata = current_metadata(context, &entry.id, current, sources).await?;
    let deprecation = metadata.deprecation?;

    let Some(alternate) = deprecation.alternate else {
        warn!(
            package = %entry.id,
            version = %current,
            reasons = ?deprecation.reasons,
            "package is deprecated but no alternate is suggested"
        );
        return None;
    };

    if manifest.contains_package(&alternate.id) {
        warn!(
            package = %entry.id,
            alternate = %alternate.id,
            "package is deprecated but its alternate is already declared"
        );
        return None;
    }

    let resolved = match find_latest(context, &alternate.id, &PackageVersion::zero(), sources).await {
        Ok(Some(resolved)) => resolved,
        Ok(None) => {
            warn!(
                package = %entry.id,
                alternate = %alternate.id,
                "alternate package not found in any source"
            );
            return None;
        }
        Err(e) => {
            warn!(
                package = %entry.id,
                alternate = %alternate.id,
                error = %e,
                "failed to resolve alternate package"
            );
            return None;
        }
    };

    let version = alternate
        .usable_min_version()
        .cloned()
        .unwrap_or(resolved.version);
    if version.is_zero() {
        return None;
    }

    Some(PlannedMigration {
        new_id: alternate.id,
        version,
    })
}

/// Metadata of the pinned version from the first source that knows it
async fn current_metadata(
    context: &UpdateContext,
    id: &str,
    version: &PackageVersion,
    sources: &[PackageSource],
) -> Option<PackageMetadata> {
    for source in sources {
        let registry = match context.clients().get(source).await {
            Ok(registry) => registry,
            Err(e) => {
                debug!(package = id, source = %source.name, error = %e, "source unavailable");
                continue;
            }
        };
        match registry.fetch_metadata(id, version).await {
            Ok(Some(metadata)) => return Some(metadata),
            Ok(None) => {}
            Err(e) => {
                debug!(package = id, source = %source.name, error = %e, "metadata lookup failed");
            }
        }
    }
    None
}
