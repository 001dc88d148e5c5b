//! Core domain models for cpmup
//!
//! This module contains the fundamental types used throughout the application:
//! - Package versions and case-insensitive package keys
//! - Manifest entries and package sources
//! - Registry metadata, including deprecation markers
//! - Update decision results and run summaries

mod entry;
mod metadata;
mod package_key;
mod source;
mod summary;
mod update_result;
mod version;

pub use entry::PackageEntry;
pub use metadata::{AlternatePackage, DeprecationInfo, PackageMetadata};
pub use package_key::{same_id, PackageKey};
pub use source::{PackageSource, DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL};
pub use summary::{ManifestUpdateResult, ProjectUpdate, SolutionMode, SolutionResult, UpdateSummary};
pub use update_result::{Migration, SkipReason, UpdateResult};
pub use version::{PackageVersion, VersionParseError};
