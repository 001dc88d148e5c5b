//! Package sources: querying published versions and their metadata
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - NuGet V3 protocol client
//! - Local folder feed
//! - Connector that opens the right client for a source
//! - Per-run cache of opened clients

mod cache;
mod client;
mod local_folder;
mod nuget_v3;

pub use cache::RegistryClientCache;
pub use client::HttpClient;
pub use local_folder::LocalFolderRegistry;
pub use nuget_v3::NuGetV3Registry;

use crate::domain::{PackageMetadata, PackageSource, PackageVersion};
use crate::error::RegistryError;
use async_trait::async_trait;
use std::sync::Arc;

/// Query interface of one opened package source
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// The source this client talks to
    fn source(&self) -> &PackageSource;

    /// All published versions, listed or not; an unknown package yields an empty list
    async fn list_versions(&self, id: &str) -> Result<Vec<PackageVersion>, RegistryError>;

    /// Metadata for one exact version, `None` if the source does not know it
    async fn fetch_metadata(
        &self,
        id: &str,
        version: &PackageVersion,
    ) -> Result<Option<PackageMetadata>, RegistryError>;
}

/// Opens clients for package sources
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Perform the handshake for a source
    async fn connect(&self, source: &PackageSource) -> Result<Arc<dyn PackageRegistry>, RegistryError>;
}

/// Connector for HTTP(S) NuGet V3 feeds and local folder feeds
#[derive(Clone)]
pub struct DefaultConnector {
    client: HttpClient,
}

impl DefaultConnector {
    /// Create a connector sharing one HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceConnector for DefaultConnector {
    async fn connect(&self, source: &PackageSource) -> Result<Arc<dyn PackageRegistry>, RegistryError> {
        if source.is_http() {
            let registry = NuGetV3Registry::connect(self.client.clone(), source.clone()).await?;
            Ok(Arc::new(registry))
        } else {
            let registry = LocalFolderRegistry::open(source.clone())?;
            Ok(Arc::new(registry))
        }
    }
}
