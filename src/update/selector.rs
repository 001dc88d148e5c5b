//! Latest eligible version lookup across package sources

use super::UpdateContext;
use crate::domain::{PackageMetadata, PackageSource, PackageVersion};
use crate::error::RegistryError;
use serde::Serialize;
use tracing::{debug, warn};

/// The best version found for a package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVersion {
    /// Package identifier as requested
    pub id: String,
    /// Selected version
    pub version: PackageVersion,
    /// Name of the source that published it
    pub source: String,
    /// Metadata of the selected version
    pub metadata: PackageMetadata,
}

/// Stability rule for automatic upgrades
///
/// A candidate must be strictly newer. From a stable version only stable
/// candidates qualify; from a pre-release any newer version does.
pub fn is_eligible(candidate: &PackageVersion, current: &PackageVersion) -> bool {
    if !current.is_prerelease() && candidate.is_prerelease() {
        return false;
    }
    candidate > current
}

/// Find the highest eligible, listed version of `id` across all sources
///
/// Every source is consulted and the global maximum wins. Within one source,
/// candidates are walked from highest to lowest and the first listed one is
/// that source's best. A source that fails is logged and skipped; an error is
/// returned only when nothing was found and at least one source failed.
pub async fn find_latest(
    context: &UpdateContext,
    id: &str,
    current: &PackageVersion,
    sources: &[PackageSource],
) -> Result<Option<ResolvedVersion>, RegistryError> {
    if let Some(cached) = context.cached_resolution(sources, id, current).await {
        return Ok(cached);
    }

    let mut best: Option<ResolvedVersion> = None;
    let mut first_error: Option<RegistryError> = None;

    for source in sources {
        match best_in_source(context, id, current, source).await {
            Ok(Some(found)) => {
                if best.as_ref().map_or(true, |b| found.version > b.version) {
                    best = Some(found);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(package = id, source = %source.name, error = %e, "package lookup failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match (best, first_error) {
        (None, Some(e)) => Err(e),
        (best, None) => {
            context
                .remember_resolution(sources, id, current, best.clone())
                .await;
            Ok(best)
        }
        (best, Some(_)) => Ok(best),
    }
}

async fn best_in_source(
    context: &UpdateContext,
    id: &str,
    current: &PackageVersion,
    source: &PackageSource,
) -> Result<Option<ResolvedVersion>, RegistryError> {
    let registry = context.clients().get(source).await?;

    let mut candidates: Vec<PackageVersion> = registry
        .list_versions(id)
        .await?
        .into_iter()
        .filter(|v| is_eligible(v, current))
        .collect();
    candidates.sort_by(|a, b| b.cmp(a));
    candidates.dedup();

    for candidate in candidates {
        match registry.fetch_metadata(id, &candidate).await? {
            Some(metadata) if metadata.listed => {
                debug!(package = id, version = %candidate, source = %source.name, "found listed candidate");
                return Ok(Some(ResolvedVersion {
                    id: id.to_string(),
                    version: candidate,
                    source: source.name.clone(),
                    metadata,
                }));
            }
            _ => debug!(package = id, version = %candidate, source = %source.name, "skipping unlisted version"),
        }
    }
    Ok(None)
}
