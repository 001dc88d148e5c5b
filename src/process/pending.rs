//! Parser for `dotnet list package --outdated` output

use serde::Serialize;

/// Row prefix of a top-level package in the listing
const ROW_PREFIX: &str = "   >";

/// Marker appended to rows of deprecated packages
const DEPRECATED_MARKER: &str = "(D)";

/// One outdated package reported for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingUpdate {
    /// Package identifier
    pub package: String,
    /// Version currently resolved
    pub resolved: String,
    /// Latest version reported by the tool
    pub latest: String,
    /// Whether the tool flagged the package as deprecated
    pub deprecated: bool,
}

impl PendingUpdate {
    fn is_applicable(&self) -> bool {
        if self.deprecated || self.latest == self.resolved {
            return false;
        }
        let resolved_is_stable = !self.resolved.contains('-');
        let latest_is_stable = !self.latest.contains('-');
        !resolved_is_stable || latest_is_stable
    }
}

/// Every package row in the listing, applicable or not
///
/// Rows have the columns `> id requested resolved latest`; rows with fewer
/// columns are ignored.
pub fn parse_updates<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<PendingUpdate> {
    lines
        .into_iter()
        .filter(|line| line.starts_with(ROW_PREFIX))
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 5 {
                return None;
            }
            Some(PendingUpdate {
                package: columns[1].to_string(),
                resolved: columns[3].to_string(),
                latest: columns[4].to_string(),
                deprecated: line.trim_end().ends_with(DEPRECATED_MARKER),
            })
        })
        .collect()
}

/// Rows that should be applied: a real change, not deprecated, and never
/// from a stable resolved version to a pre-release
pub fn parse_with_updates<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<PendingUpdate> {
    parse_updates(lines)
        .into_iter()
        .filter(PendingUpdate::is_applicable)
        .collect()
}
