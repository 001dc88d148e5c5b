//! Project files that reference centrally versioned packages

use super::{TextFormat, XmlDocument};
use crate::domain::same_id;
use crate::error::ManifestError;
use std::path::Path;

/// Extensions of project files that can carry package references
pub const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

const PACKAGE_REFERENCE: &str = "PackageReference";
const INCLUDE: &str = "Include";

/// Returns true if the path looks like a project file
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PROJECT_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
}

/// A loaded project file
#[derive(Debug, Clone)]
pub struct ProjectFile {
    document: XmlDocument,
    format: TextFormat,
    original: String,
}

impl ProjectFile {
    /// Parse project content, capturing its line-terminator format first
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let format = TextFormat::detect(content);
        let document = XmlDocument::parse(content)?;
        Ok(Self {
            document,
            format,
            original: content.to_string(),
        })
    }

    /// Identifiers of all `PackageReference` elements
    pub fn references(&self) -> Vec<&str> {
        self.document
            .elements_named(PACKAGE_REFERENCE)
            .filter_map(|(_, e)| e.attribute(INCLUDE))
            .collect()
    }

    /// Rewrite every reference to `old_id` (any case) to `new_id`
    ///
    /// Returns the number of references changed.
    pub fn rename_references(&mut self, old_id: &str, new_id: &str) -> usize {
        let targets: Vec<usize> = self
            .document
            .elements_named(PACKAGE_REFERENCE)
            .filter(|(_, e)| e.attribute(INCLUDE).is_some_and(|id| same_id(id, old_id)))
            .map(|(index, _)| index)
            .collect();

        let mut changed = 0;
        for index in targets {
            if self.document.set_attribute(index, INCLUDE, new_id) {
                changed += 1;
            }
        }
        changed
    }

    /// Returns true if any reference was rewritten
    pub fn is_modified(&self) -> bool {
        self.document.text() != self.original
    }

    /// Serialize with the captured format re-applied
    pub fn render(&self) -> String {
        self.format.apply(self.document.text()).into_owned()
    }
}
