//! Solution exclusion patterns

/// Environment variable holding comma-separated exclusion patterns
pub const IGNORE_ENV_VAR: &str = "PackageUpdateIgnores";

/// Excludes solutions whose path contains any pattern, ignoring case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excluder {
    patterns: Vec<String>,
}

impl Excluder {
    /// Create an excluder from explicit patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Parse a comma-separated list, trimming entries and dropping empties
    pub fn from_list(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// Read patterns from the `PackageUpdateIgnores` environment variable
    pub fn from_env() -> Self {
        std::env::var(IGNORE_ENV_VAR)
            .map(|value| Self::from_list(&value))
            .unwrap_or_default()
    }

    /// Add more patterns (builder pattern)
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns.extend(Self::new(patterns).patterns);
        self
    }

    /// Returns true if the solution path matches any pattern
    pub fn should_exclude(&self, solution: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let solution = solution.to_lowercase();
        self.patterns.iter().any(|p| solution.contains(p.as_str()))
    }

    /// Configured patterns, lower-cased
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
