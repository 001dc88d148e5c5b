//! Update filter configuration
//!
//! This module provides the UpdateFilter struct that narrows an update run to
//! a single package.

use crate::domain::same_id;

/// Filter configuration for an update run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    /// If set, only this package (any case) is updated
    pub package: Option<String>,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to one package; blank names are ignored
    pub fn with_package(mut self, package: Option<impl Into<String>>) -> Self {
        self.package = package
            .map(Into::into)
            .map(|p: String| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    /// Returns true if a package filter is set
    pub fn is_active(&self) -> bool {
        self.package.is_some()
    }

    /// Check if a package should be processed
    pub fn should_process_package(&self, id: &str) -> bool {
        match self.package {
            Some(ref package) => same_id(package, id),
            None => true,
        }
    }
}
