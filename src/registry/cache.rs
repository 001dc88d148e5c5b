//! Per-run cache of opened package source clients

use super::{PackageRegistry, SourceConnector};
use crate::domain::PackageSource;
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Opened client, or the reason the handshake failed
type Connection = Result<Arc<dyn PackageRegistry>, String>;

/// Memoizes one client per source URL for the lifetime of a run
///
/// Failed handshakes are remembered too, so an unreachable source is only
/// contacted once per run.
pub struct RegistryClientCache {
    connector: Arc<dyn SourceConnector>,
    clients: Mutex<HashMap<String, Connection>>,
}

impl RegistryClientCache {
    /// Create an empty cache around a connector
    pub fn new(connector: Arc<dyn SourceConnector>) -> Self {
        Self {
            connector,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Client for a source, connecting on first use
    ///
    /// The map is not locked during the handshake, so different sources
    /// connect independently. If two callers race on one source, the first
    /// stored connection wins.
    pub async fn get(&self, source: &PackageSource) -> Result<Arc<dyn PackageRegistry>, RegistryError> {
        if let Some(connection) = self.clients.lock().await.get(&source.url) {
            return connection
                .clone()
                .map_err(|message| RegistryError::network_error("", &source.name, message));
        }

        debug!(source = %source.name, url = %source.url, "connecting to package source");
        let connection = match self.connector.connect(source).await {
            Ok(client) => Ok(client),
            Err(e) => {
                warn!(source = %source.name, error = %e, "failed to connect to package source");
                Err(e.to_string())
            }
        };

        self.clients
            .lock()
            .await
            .entry(source.url.clone())
            .or_insert(connection)
            .clone()
            .map_err(|message| RegistryError::network_error("", &source.name, message))
    }

    /// Number of sources contacted so far
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Returns true if no source has been contacted
    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}
