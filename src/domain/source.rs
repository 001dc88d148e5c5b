//! Package source definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// The public NuGet gallery, used when no configuration file exists
pub const DEFAULT_SOURCE_NAME: &str = "nuget.org";

/// Service index URL of the public NuGet gallery
pub const DEFAULT_SOURCE_URL: &str = "https://api.nuget.org/v3/index.json";

/// A configured package source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSource {
    /// Key from the configuration file
    pub name: String,
    /// Service index URL or local directory
    pub url: String,
    /// Disabled sources never take part in resolution
    pub enabled: bool,
}

impl PackageSource {
    /// Creates an enabled source
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }

    /// The public NuGet gallery
    pub fn nuget_org() -> Self {
        Self::new(DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL)
    }

    /// Returns true if the source is reached over HTTP(S)
    pub fn is_http(&self) -> bool {
        let lower = self.url.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
