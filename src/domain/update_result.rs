//! Per-entry update decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why an entry was left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Entry carries `Pinned="true"`
    Pinned,
    /// No newer eligible listed version exists
    AlreadyLatest,
    /// Declared version could not be parsed
    InvalidVersion(String),
    /// Every source failed while looking the package up
    LookupFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Pinned => write!(f, "pinned version"),
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::InvalidVersion(msg) => write!(f, "invalid version: {}", msg),
            SkipReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
        }
    }
}

/// A package identity change caused by deprecation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Deprecated identifier
    pub old_id: String,
    /// Replacement identifier
    pub new_id: String,
}

impl Migration {
    /// Creates a new migration record
    pub fn new(old_id: impl Into<String>, new_id: impl Into<String>) -> Self {
        Self {
            old_id: old_id.into(),
            new_id: new_id.into(),
        }
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.old_id, self.new_id)
    }
}

/// Result of processing a single manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// Version bumped in place
    Update {
        id: String,
        from: String,
        to: String,
    },
    /// Entry rewritten to a replacement package
    Migrate {
        from_id: String,
        to_id: String,
        from_version: String,
        to_version: String,
    },
    /// Entry left unchanged
    Skip {
        id: String,
        version: String,
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates an Update result
    pub fn update(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        UpdateResult::Update {
            id: id.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a Migrate result
    pub fn migrate(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
    ) -> Self {
        UpdateResult::Migrate {
            from_id: from_id.into(),
            to_id: to_id.into(),
            from_version: from_version.into(),
            to_version: to_version.into(),
        }
    }

    /// Creates a Skip result
    pub fn skip(id: impl Into<String>, version: impl Into<String>, reason: SkipReason) -> Self {
        UpdateResult::Skip {
            id: id.into(),
            version: version.into(),
            reason,
        }
    }

    /// Returns true if this is an update result
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateResult::Update { .. })
    }

    /// Returns true if this is a migration result
    pub fn is_migration(&self) -> bool {
        matches!(self, UpdateResult::Migrate { .. })
    }

    /// Returns true if this is a skip result
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skip { .. })
    }

    /// Returns true if the entry was changed in the document
    pub fn is_change(&self) -> bool {
        !self.is_skip()
    }

    /// Returns the package identifier as it was before processing
    pub fn package_name(&self) -> &str {
        match self {
            UpdateResult::Update { id, .. } => id,
            UpdateResult::Migrate { from_id, .. } => from_id,
            UpdateResult::Skip { id, .. } => id,
        }
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Update { id, from, to } => write!(f, "{}: {} → {}", id, from, to),
            UpdateResult::Migrate {
                from_id,
                to_id,
                from_version,
                to_version,
            } => write!(
                f,
                "{} {} → {} {} (deprecated)",
                from_id, from_version, to_id, to_version
            ),
            UpdateResult::Skip { id, reason, .. } => write!(f, "{}: skipped ({})", id, reason),
        }
    }
}
