//! Per-run state shared by every manifest update

use super::ResolvedVersion;
use crate::domain::{PackageKey, PackageSource, PackageVersion};
use crate::registry::{RegistryClientCache, SourceConnector};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Resolution cache key: the sources consulted plus the (package, version) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    sources: Vec<String>,
    package: PackageKey,
}

impl ResolutionKey {
    fn new(sources: &[PackageSource], id: &str, current: &PackageVersion) -> Self {
        Self {
            sources: sources.iter().map(|s| s.url.clone()).collect(),
            package: PackageKey::new(id, current.clone()),
        }
    }
}

/// Client cache and resolution memo for one invocation
pub struct UpdateContext {
    clients: RegistryClientCache,
    resolutions: Mutex<HashMap<ResolutionKey, Option<ResolvedVersion>>>,
}

impl UpdateContext {
    /// Create a context around a source connector
    pub fn new(connector: Arc<dyn SourceConnector>) -> Self {
        Self {
            clients: RegistryClientCache::new(connector),
            resolutions: Mutex::new(HashMap::new()),
        }
    }

    /// Opened package source clients
    pub fn clients(&self) -> &RegistryClientCache {
        &self.clients
    }

    /// Previously resolved lookup, if any
    pub(crate) async fn cached_resolution(
        &self,
        sources: &[PackageSource],
        id: &str,
        current: &PackageVersion,
    ) -> Option<Option<ResolvedVersion>> {
        let key = ResolutionKey::new(sources, id, current);
        self.resolutions.lock().await.get(&key).cloned()
    }

    /// Remember a lookup result
    pub(crate) async fn remember_resolution(
        &self,
        sources: &[PackageSource],
        id: &str,
        current: &PackageVersion,
        resolved: Option<ResolvedVersion>,
    ) {
        let key = ResolutionKey::new(sources, id, current);
        self.resolutions.lock().await.insert(key, resolved);
    }
}
