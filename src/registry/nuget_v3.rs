//! NuGet V3 protocol client
//!
//! Resources used from the service index:
//! - `PackageBaseAddress/3.0.0`: `{base}/{id-lower}/index.json` lists all versions
//! - `RegistrationsBaseUrl/3.6.0` (or 3.4.0, or unversioned): per-version
//!   listing state and deprecation metadata

use crate::domain::{AlternatePackage, DeprecationInfo, PackageMetadata, PackageSource, PackageVersion};
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageRegistry};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

/// Registration resource types, most preferred first
const REGISTRATION_TYPES: &[&str] = &[
    "RegistrationsBaseUrl/3.6.0",
    "RegistrationsBaseUrl/3.4.0",
    "RegistrationsBaseUrl",
];

/// Publication year used by older feeds to mark unlisted versions
const UNLISTED_PUBLISH_YEAR: i32 = 1900;

/// Service index document
#[derive(Debug, Deserialize)]
struct ServiceIndex {
    #[serde(default)]
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: String,
}

/// Flat container version list
#[derive(Debug, Deserialize)]
struct VersionList {
    #[serde(default)]
    versions: Vec<String>,
}

/// Registration index: one or more pages of leaves
#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(rename = "@id")]
    id: String,
    lower: Option<String>,
    upper: Option<String>,
    /// Absent when the page must be fetched separately
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Deserialize)]
struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    catalog_entry: CatalogEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: String,
    version: String,
    listed: Option<bool>,
    published: Option<String>,
    deprecation: Option<Deprecation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Deprecation {
    #[serde(default)]
    reasons: Vec<String>,
    message: Option<String>,
    alternate_package: Option<AlternatePackageJson>,
}

#[derive(Debug, Deserialize)]
struct AlternatePackageJson {
    id: String,
    range: Option<String>,
}

impl CatalogEntry {
    fn into_metadata(self) -> Option<PackageMetadata> {
        let version = PackageVersion::parse(&self.version).ok()?;
        let published = self
            .published
            .as_deref()
            .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
            .map(|p| p.with_timezone(&Utc));
        let listed = self.listed.unwrap_or(true)
            && published.map_or(true, |p| p.year() != UNLISTED_PUBLISH_YEAR);
        let deprecation = self.deprecation.map(|d| DeprecationInfo {
            reasons: d.reasons,
            message: d.message,
            alternate: d
                .alternate_package
                .map(|alt| AlternatePackage::from_range(alt.id, alt.range.as_deref())),
        });

        Some(PackageMetadata {
            id: self.id,
            version,
            listed,
            published,
            deprecation,
        })
    }
}

/// Page of a registration index with its version bounds
#[derive(Debug)]
struct PageRef {
    url: String,
    lower: Option<PackageVersion>,
    upper: Option<PackageVersion>,
    leaves: Option<Arc<Vec<PackageMetadata>>>,
}

impl PageRef {
    fn covers(&self, version: &PackageVersion) -> bool {
        self.lower.as_ref().map_or(true, |l| l <= version)
            && self.upper.as_ref().map_or(true, |u| version <= u)
    }
}

/// Client for one NuGet V3 source
pub struct NuGetV3Registry {
    client: HttpClient,
    source: PackageSource,
    base_address: String,
    registrations_base: String,
    /// Registration index per lower-cased package id
    registrations: Mutex<HashMap<String, Arc<Vec<PageRef>>>>,
    /// Leaves of separately fetched pages, keyed by page URL
    pages: Mutex<HashMap<String, Arc<Vec<PackageMetadata>>>>,
}

impl NuGetV3Registry {
    /// Fetch the service index and resolve the resources this client needs
    pub async fn connect(client: HttpClient, source: PackageSource) -> Result<Self, RegistryError> {
        let index: ServiceIndex = client.get_json(&source.url, "", &source.name).await?;

        let find = |kind: &str| {
            index
                .resources
                .iter()
                .find(|r| r.kind == kind)
                .map(|r| r.id.trim_end_matches('/').to_string())
        };

        let base_address = find(PACKAGE_BASE_ADDRESS).ok_or_else(|| RegistryError::MissingResource {
            source_name: source.name.clone(),
            resource: PACKAGE_BASE_ADDRESS.to_string(),
        })?;
        let registrations_base = REGISTRATION_TYPES
            .iter()
            .find_map(|kind| find(*kind))
            .ok_or_else(|| RegistryError::MissingResource {
                source_name: source.name.clone(),
                resource: "RegistrationsBaseUrl".to_string(),
            })?;

        debug!(source = %source.name, %base_address, %registrations_base, "connected to NuGet V3 source");

        Ok(Self {
            client,
            source,
            base_address,
            registrations_base,
            registrations: Mutex::new(HashMap::new()),
            pages: Mutex::new(HashMap::new()),
        })
    }

    fn versions_url(&self, id: &str) -> String {
        format!("{}/{}/index.json", self.base_address, id.to_lowercase())
    }

    fn registration_url(&self, id: &str) -> String {
        format!("{}/{}/index.json", self.registrations_base, id.to_lowercase())
    }

    async fn registration_pages(&self, id: &str) -> Result<Arc<Vec<PageRef>>, RegistryError> {
        let key = id.to_lowercase();
        let mut registrations = self.registrations.lock().await;
        if let Some(pages) = registrations.get(&key) {
            return Ok(Arc::clone(pages));
        }

        let index: Option<RegistrationIndex> = self
            .client
            .get_optional_json(&self.registration_url(id), id, &self.source.name)
            .await?;
        let pages: Vec<PageRef> = index
            .map(|index| index.items)
            .unwrap_or_default()
            .into_iter()
            .map(|page| PageRef {
                url: page.id,
                lower: page.lower.and_then(|v| PackageVersion::parse(&v).ok()),
                upper: page.upper.and_then(|v| PackageVersion::parse(&v).ok()),
                leaves: page.items.map(|items| Arc::new(leaves_to_metadata(items))),
            })
            .collect();

        let pages = Arc::new(pages);
        registrations.insert(key, Arc::clone(&pages));
        Ok(pages)
    }

    async fn page_leaves(&self, id: &str, page: &PageRef) -> Result<Arc<Vec<PackageMetadata>>, RegistryError> {
        if let Some(ref leaves) = page.leaves {
            return Ok(Arc::clone(leaves));
        }

        let mut pages = self.pages.lock().await;
        if let Some(leaves) = pages.get(&page.url) {
            return Ok(Arc::clone(leaves));
        }

        let fetched: RegistrationPage = self.client.get_json(&page.url, id, &self.source.name).await?;
        let leaves = Arc::new(leaves_to_metadata(fetched.items.unwrap_or_default()));
        pages.insert(page.url.clone(), Arc::clone(&leaves));
        Ok(leaves)
    }
}

fn leaves_to_metadata(items: Vec<RegistrationLeaf>) -> Vec<PackageMetadata> {
    items
        .into_iter()
        .filter_map(|leaf| leaf.catalog_entry.into_metadata())
        .collect()
}

#[async_trait]
impl PackageRegistry for NuGetV3Registry {
    fn source(&self) -> &PackageSource {
        &self.source
    }

    async fn list_versions(&self, id: &str) -> Result<Vec<PackageVersion>, RegistryError> {
        let list: Option<VersionList> = self
            .client
            .get_optional_json(&self.versions_url(id), id, &self.source.name)
            .await?;

        Ok(list
            .map(|list| list.versions)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| PackageVersion::parse(v).ok())
            .collect())
    }

    async fn fetch_metadata(
        &self,
        id: &str,
        version: &PackageVersion,
    ) -> Result<Option<PackageMetadata>, RegistryError> {
        let pages = self.registration_pages(id).await?;
        for page in pages.iter().filter(|p| p.covers(version)) {
            let leaves = self.page_leaves(id, page).await?;
            if let Some(found) = leaves.iter().find(|m| &m.version == version) {
                return Ok(Some(found.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_service_index() {
        let json = r#"{
            "version": "3.0.0",
            "resources": [
                {"@id": "https://api.nuget.org/v3-flatcontainer/", "@type": "PackageBaseAddress/3.0.0"},
                {"@id": "https://api.nuget.org/v3/registration5-gz-semver2/", "@type": "RegistrationsBaseUrl/3.6.0"},
                {"@id": "https://api.nuget.org/v3/registration5-semver1/", "@type": "RegistrationsBaseUrl"}
            ]
        }"#;
        let index: ServiceIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.resources.len(), 3);
        assert_eq!(index.resources[0].kind, PACKAGE_BASE_ADDRESS);
    }

    #[test]
    fn test_parse_version_list() {
        let json = r#"{"versions": ["1.0.0", "1.1.0-beta", "2.0.0"]}"#;
        let list: VersionList = serde_json::from_str(json).unwrap();
        assert_eq!(list.versions, vec!["1.0.0", "1.1.0-beta", "2.0.0"]);
    }

    #[test]
    fn test_catalog_entry_with_deprecation() {
        let json = r#"{
            "id": "WindowsAzure.Storage",
            "version": "9.3.3",
            "listed": true,
            "published": "2018-11-28T23:22:03.44+00:00",
            "deprecation": {
                "reasons": ["Legacy"],
                "message": "Use Azure.Storage.Blobs",
                "alternatePackage": {"id": "Azure.Storage.Blobs", "range": "[12.0.0, )"}
            }
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        let meta = entry.into_metadata().unwrap();

        assert!(meta.listed);
        assert_eq!(meta.version, v("9.3.3"));
        assert!(meta.published.is_some());
        let deprecation = meta.deprecation.unwrap();
        assert_eq!(deprecation.reasons, vec!["Legacy"]);
        let alternate = deprecation.alternate.unwrap();
        assert_eq!(alternate.id, "Azure.Storage.Blobs");
        assert_eq!(alternate.min_version, Some(v("12.0.0")));
    }

    #[test]
    fn test_catalog_entry_unlisted_flag_and_legacy_date() {
        let json = r#"{"id": "Foo", "version": "1.1.0", "listed": false}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.into_metadata().unwrap().listed);

        let json = r#"{"id": "Foo", "version": "1.1.0", "published": "1900-01-01T00:00:00+00:00"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.into_metadata().unwrap().listed);

        let json = r#"{"id": "Foo", "version": "1.2.0"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert!(entry.into_metadata().unwrap().listed);
    }

    #[test]
    fn test_registration_index_inline_and_remote_pages() {
        let json = r#"{
            "count": 2,
            "items": [
                {
                    "@id": "https://example.com/reg/foo/page/1.0.0/1.2.0.json",
                    "lower": "1.0.0",
                    "upper": "1.2.0",
                    "items": [
                        {"catalogEntry": {"id": "Foo", "version": "1.0.0"}},
                        {"catalogEntry": {"id": "Foo", "version": "1.2.0"}}
                    ]
                },
                {
                    "@id": "https://example.com/reg/foo/page/2.0.0/3.0.0.json",
                    "lower": "2.0.0",
                    "upper": "3.0.0"
                }
            ]
        }"#;
        let index: RegistrationIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.items.len(), 2);
        assert_eq!(index.items[0].items.as_ref().unwrap().len(), 2);
        assert!(index.items[1].items.is_none());
    }

    #[test]
    fn test_page_covers() {
        let page = PageRef {
            url: String::new(),
            lower: Some(v("1.0.0")),
            upper: Some(v("2.0.0")),
            leaves: None,
        };
        assert!(page.covers(&v("1.0.0")));
        assert!(page.covers(&v("1.5.0-beta")));
        assert!(page.covers(&v("2.0.0")));
        assert!(!page.covers(&v("2.0.1")));

        let open = PageRef {
            url: String::new(),
            lower: None,
            upper: None,
            leaves: None,
        };
        assert!(open.covers(&v("99.0.0")));
    }
}
