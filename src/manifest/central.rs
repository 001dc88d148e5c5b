//! Central package manifest (`Directory.Packages.props`)

use super::{TextFormat, XmlDocument};
use crate::domain::{same_id, PackageEntry};
use crate::error::ManifestError;

/// File name of the central package manifest
pub const CENTRAL_MANIFEST_FILE: &str = "Directory.Packages.props";

const PACKAGE_VERSION: &str = "PackageVersion";
const INCLUDE: &str = "Include";
const VERSION: &str = "Version";
const PINNED: &str = "Pinned";

/// A loaded central manifest
#[derive(Debug, Clone)]
pub struct CentralManifest {
    document: XmlDocument,
    format: TextFormat,
    original: String,
}

impl CentralManifest {
    /// Parse manifest content, capturing its line-terminator format first
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let format = TextFormat::detect(content);
        let document = XmlDocument::parse(content)?;
        Ok(Self {
            document,
            format,
            original: content.to_string(),
        })
    }

    /// Version pin entries that carry both `Include` and `Version`, in document order
    pub fn entries(&self) -> Vec<PackageEntry> {
        self.document
            .elements_named(PACKAGE_VERSION)
            .filter_map(|(index, element)| {
                let id = element.attribute(INCLUDE)?;
                let version = element.attribute(VERSION)?;
                let pinned = element
                    .attribute(PINNED)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
                Some(PackageEntry::new(index, id, version).with_pinned(pinned))
            })
            .collect()
    }

    /// Returns true if any `PackageVersion` element declares the package
    pub fn contains_package(&self, id: &str) -> bool {
        self.document
            .elements_named(PACKAGE_VERSION)
            .any(|(_, e)| e.attribute(INCLUDE).is_some_and(|include| same_id(include, id)))
    }

    /// Overwrite the `Version` attribute of an entry
    pub fn set_version(&mut self, entry: &PackageEntry, version: &str) -> bool {
        self.document.set_attribute(entry.element, VERSION, version)
    }

    /// Overwrite the `Include` attribute of an entry
    pub fn set_id(&mut self, entry: &PackageEntry, id: &str) -> bool {
        self.document.set_attribute(entry.element, INCLUDE, id)
    }

    /// Returns true if any attribute was rewritten
    pub fn is_modified(&self) -> bool {
        self.document.text() != self.original
    }

    /// Captured line-terminator format
    pub fn format(&self) -> TextFormat {
        self.format
    }

    /// Serialize with the captured format re-applied
    pub fn render(&self) -> String {
        self.format.apply(self.document.text()).into_owned()
    }
}
