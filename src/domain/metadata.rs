//! Per-version registry metadata: listing state and deprecation

use super::PackageVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata published for one version of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package identifier as reported by the source
    pub id: String,
    /// The version this record describes
    pub version: PackageVersion,
    /// Unlisted versions exist but must never be selected automatically
    pub listed: bool,
    /// Publication time, when the source reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    /// Deprecation marker, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<DeprecationInfo>,
}

impl PackageMetadata {
    /// A listed, non-deprecated record
    pub fn listed(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            id: id.into(),
            version,
            listed: true,
            published: None,
            deprecation: None,
        }
    }

    /// An unlisted record
    pub fn unlisted(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            listed: false,
            ..Self::listed(id, version)
        }
    }

    /// Attach a deprecation marker (builder pattern)
    pub fn with_deprecation(mut self, deprecation: DeprecationInfo) -> Self {
        self.deprecation = Some(deprecation);
        self
    }

    /// Returns true if the version is marked deprecated
    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }
}

/// Deprecation marker attached to a published version
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeprecationInfo {
    /// Reasons such as "Legacy" or "CriticalBugs"
    pub reasons: Vec<String>,
    /// Free-form message from the package owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Suggested replacement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<AlternatePackage>,
}

impl DeprecationInfo {
    /// Deprecation with reasons and no replacement
    pub fn new(reasons: Vec<String>) -> Self {
        Self {
            reasons,
            ..Self::default()
        }
    }

    /// Attach a suggested replacement (builder pattern)
    pub fn with_alternate(mut self, alternate: AlternatePackage) -> Self {
        self.alternate = Some(alternate);
        self
    }
}

/// Replacement package suggested by a deprecation marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternatePackage {
    /// Identifier of the replacement
    pub id: String,
    /// Lower bound of the suggested range; `None` or zero means unconstrained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<PackageVersion>,
}

impl AlternatePackage {
    /// Create an alternate with an optional minimum version
    pub fn new(id: impl Into<String>, min_version: Option<PackageVersion>) -> Self {
        Self {
            id: id.into(),
            min_version,
        }
    }

    /// Build an alternate from a version range such as `[12.0.0, )` or `[,)`
    ///
    /// A bare version is treated as its own lower bound. Unparseable bounds
    /// degrade to "no constraint".
    pub fn from_range(id: impl Into<String>, range: Option<&str>) -> Self {
        let min_version = range.and_then(range_lower_bound);
        Self::new(id, min_version)
    }

    /// Minimum version that may be written literally, skipping the zero sentinel
    pub fn usable_min_version(&self) -> Option<&PackageVersion> {
        self.min_version.as_ref().filter(|v| !v.is_zero())
    }
}

/// Inclusive lower bound of a version range
///
/// An exclusive bound such as `(1.0.0,)` names a version that must not be
/// used, so it yields nothing.
fn range_lower_bound(range: &str) -> Option<PackageVersion> {
    let range = range.trim();
    if range.starts_with('(') {
        return None;
    }
    let lower = if let Some(inner) = range.strip_prefix('[') {
        inner.split(',').next().unwrap_or_default()
    } else {
        range
    };
    let lower = lower.trim().trim_end_matches([']', ')']);
    if lower.is_empty() {
        return None;
    }
    PackageVersion::parse(lower).ok()
}
