//! Hierarchical local folder feeds
//!
//! Layout: `{root}/{id}/{version}/`. Package folders are matched ignoring case.
//! Every version found is listed and none is deprecated.

use crate::domain::{PackageMetadata, PackageSource, PackageVersion};
use crate::error::RegistryError;
use crate::registry::PackageRegistry;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// A package source backed by a directory tree
pub struct LocalFolderRegistry {
    source: PackageSource,
    root: PathBuf,
}

impl LocalFolderRegistry {
    /// Open a local feed; the root must be an existing directory
    pub fn open(source: PackageSource) -> Result<Self, RegistryError> {
        let root = PathBuf::from(source.url.trim_start_matches("file://"));
        if !root.is_dir() {
            return Err(RegistryError::UnsupportedSource {
                source_name: source.name.clone(),
                url: source.url.clone(),
            });
        }
        Ok(Self { source, root })
    }

    async fn package_dir(&self, id: &str) -> Result<Option<PathBuf>, RegistryError> {
        let exact = self.root.join(id.to_lowercase());
        if fs::metadata(&exact).await.is_ok_and(|m| m.is_dir()) {
            return Ok(Some(exact));
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| self.io_error(id, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_error(id, e))? {
            if entry.file_name().to_string_lossy().eq_ignore_ascii_case(id)
                && entry.file_type().await.is_ok_and(|t| t.is_dir())
            {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }

    fn io_error(&self, id: &str, e: std::io::Error) -> RegistryError {
        RegistryError::network_error(id, &self.source.name, e.to_string())
    }
}

#[async_trait]
impl PackageRegistry for LocalFolderRegistry {
    fn source(&self) -> &PackageSource {
        &self.source
    }

    async fn list_versions(&self, id: &str) -> Result<Vec<PackageVersion>, RegistryError> {
        let Some(dir) = self.package_dir(id).await? else {
            return Ok(Vec::new());
        };

        let mut versions = Vec::new();
        let mut entries = fs::read_dir(&dir).await.map_err(|e| self.io_error(id, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_error(id, e))? {
            if !entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                continue;
            }
            if let Ok(version) = PackageVersion::parse(&entry.file_name().to_string_lossy()) {
                versions.push(version);
            }
        }
        versions.sort();
        Ok(versions)
    }

    async fn fetch_metadata(
        &self,
        id: &str,
        version: &PackageVersion,
    ) -> Result<Option<PackageMetadata>, RegistryError> {
        let found = self
            .list_versions(id)
            .await?
            .into_iter()
            .find(|v| v == version);
        Ok(found.map(|v| PackageMetadata::listed(id, v)))
    }
}
