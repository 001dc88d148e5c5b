//! Manifest file reading and writing
//!
//! This module provides:
//! - Loading of central manifests and project files with path-annotated errors
//! - ManifestWriter for persisting edited documents
//! - Dry-run mode support (no actual file modifications)

use super::{CentralManifest, ProjectFile};
use crate::error::ManifestError;
use std::fs;
use std::path::Path;

/// A document that can be written back to disk
pub trait Rewritable {
    /// Returns true if the in-memory content differs from what was loaded
    fn is_modified(&self) -> bool;

    /// Content to write, with the original format re-applied
    fn render(&self) -> String;
}

impl Rewritable for CentralManifest {
    fn is_modified(&self) -> bool {
        CentralManifest::is_modified(self)
    }

    fn render(&self) -> String {
        CentralManifest::render(self)
    }
}

impl Rewritable for ProjectFile {
    fn is_modified(&self) -> bool {
        ProjectFile::is_modified(self)
    }

    fn render(&self) -> String {
        ProjectFile::render(self)
    }
}

/// Writer that persists edited documents
#[derive(Debug, Clone, Copy)]
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write the document if it was modified
    ///
    /// Returns true when the document had changes, whether or not they were
    /// written. Unmodified documents are never touched on disk.
    pub fn save(&self, path: &Path, document: &impl Rewritable) -> Result<bool, ManifestError> {
        if !document.is_modified() {
            return Ok(false);
        }
        if !self.dry_run {
            write_manifest(path, &document.render())?;
        }
        Ok(true)
    }
}

/// Load and parse a central manifest
pub fn load_central(path: &Path) -> Result<CentralManifest, ManifestError> {
    let content = read_manifest(path)?;
    CentralManifest::parse(&content).map_err(|e| e.with_path(path))
}

/// Load and parse a project file
pub fn load_project(path: &Path) -> Result<ProjectFile, ManifestError> {
    let content = read_manifest(path)?;
    ProjectFile::parse(&content).map_err(|e| e.with_path(path))
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::not_found(path)
        } else {
            ManifestError::read_error(path, e)
        }
    })
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}
