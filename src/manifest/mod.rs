//! Manifest and project file handling
//!
//! This module provides functionality to:
//! - Capture and re-apply line-terminator conventions
//! - Edit XML-like MSBuild files in place without reformatting them
//! - Read version pins from the central package manifest
//! - Rewrite package references in project files

mod central;
mod document;
mod project;
mod text_format;
mod writer;

pub use central::{CentralManifest, CENTRAL_MANIFEST_FILE};
pub use document::{Attribute, Element, XmlDocument};
pub use project::{is_project_file, ProjectFile, PROJECT_EXTENSIONS};
pub use text_format::{Newline, TextFormat};
pub use writer::{
    load_central, load_project, read_manifest, write_manifest, ManifestWriter, Rewritable,
};
