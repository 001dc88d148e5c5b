//! NuGet-style package versions
//!
//! Versions have one to four numeric components, an optional pre-release
//! label and optional build metadata. Ordering of the first three components
//! and of the label follows semantic versioning (via the `semver` crate); the
//! fourth "revision" component sorts between patch and label. Labels compare
//! case-insensitively and metadata never participates in equality.

use semver::Prerelease;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Error returned when a version string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError {
    /// The rejected input
    pub input: String,
    /// Why it was rejected
    pub message: String,
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for VersionParseError {}

/// A parsed package version
#[derive(Debug, Clone)]
pub struct PackageVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    /// Normalised label used for ordering
    pre: Prerelease,
    /// Label as written, used for display
    label: String,
    metadata: Option<String>,
}

impl PackageVersion {
    /// Create a stable three-part version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            pre: Prerelease::EMPTY,
            label: String::new(),
            metadata: None,
        }
    }

    /// The `0.0.0` version, used as "no lower bound"
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let fail = |message: &str| VersionParseError {
            input: input.to_string(),
            message: message.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(fail("empty version"));
        }

        let (rest, metadata) = match trimmed.split_once('+') {
            Some((rest, meta)) => {
                if meta.is_empty() || !meta.split('.').all(is_identifier) {
                    return Err(fail("invalid build metadata"));
                }
                (rest, Some(meta.to_string()))
            }
            None => (trimmed, None),
        };

        let (numbers, label) = match rest.split_once('-') {
            Some((numbers, label)) => {
                if label.is_empty() || !label.split('.').all(is_identifier) {
                    return Err(fail("invalid pre-release label"));
                }
                (numbers, label)
            }
            None => (rest, ""),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(fail("too many numeric components"));
        }
        let mut components = [0u64; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(fail("numeric component expected"));
            }
            *slot = part.parse().map_err(|_| fail("numeric component overflow"))?;
        }

        let pre = if label.is_empty() {
            Prerelease::EMPTY
        } else {
            Prerelease::new(&ordering_label(label)).map_err(|e| fail(&e.to_string()))?
        };

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            revision: components[3],
            pre,
            label: label.to_string(),
            metadata,
        })
    }

    /// Returns true when the version carries a pre-release label
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Returns true for any representation of `0.0.0`
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Pre-release label as written, empty for stable versions
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Major and minor components
    pub fn major_minor(&self) -> (u64, u64) {
        (self.major, self.minor)
    }

    fn numeric_key(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }
}

fn is_identifier(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Lower-cased label with leading zeros dropped from numeric identifiers
///
/// `beta.01` and `beta.1` compare equal, as NuGet treats them.
fn ordering_label(label: &str) -> String {
    label
        .split('.')
        .map(|part| {
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let trimmed = part.trim_start_matches('0');
                if trimmed.is_empty() {
                    "0".to_string()
                } else {
                    trimmed.to_string()
                }
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.revision != 0 {
            write!(f, ".{}", self.revision)?;
        }
        if !self.label.is_empty() {
            write!(f, "-{}", self.label)?;
        }
        if let Some(ref metadata) = self.metadata {
            write!(f, "+{}", metadata)?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.numeric_key() == other.numeric_key() && self.pre == other.pre
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric_key().hash(state);
        self.pre.hash(state);
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // semver's Prerelease sorts the empty label above any non-empty one
        self.numeric_key()
            .cmp(&other.numeric_key())
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PackageVersion::parse(&raw).map_err(serde::de::Error::custom)
    }
}
