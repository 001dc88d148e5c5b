//! Version pin entries declared in a central package manifest

use serde::{Deserialize, Serialize};

/// A single `PackageVersion` element of a central manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Index of the element inside its document
    #[serde(skip)]
    pub element: usize,
    /// Package identifier (`Include`)
    pub id: String,
    /// Declared version string (`Version`), as written
    pub version: String,
    /// Exempt from updates (`Pinned="true"`)
    pub pinned: bool,
}

impl PackageEntry {
    /// Creates a new unpinned entry
    pub fn new(element: usize, id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            element,
            id: id.into(),
            version: version.into(),
            pinned: false,
        }
    }

    /// Mark the entry as pinned (builder pattern)
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Returns true if the identifier matches, ignoring ASCII case
    pub fn matches(&self, id: &str) -> bool {
        super::same_id(&self.id, id)
    }
}
