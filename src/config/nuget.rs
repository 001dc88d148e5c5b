//! Layered NuGet package source configuration
//!
//! Configuration files are collected from the user-level location and from
//! every directory between the filesystem root and the target directory, then
//! applied from lowest to highest priority:
//!
//! 1. user-level `NuGet.Config`
//! 2. the farthest ancestor directory
//! 3. ... down to the target directory itself
//!
//! Within `<packageSources>`, `<clear />` drops everything accumulated so far
//! and `<add key value />` replaces an existing key in place or appends.
//! `<disabledPackageSources>` entries with `value="true"` disable a key.

use crate::domain::PackageSource;
use crate::error::ConfigError;
use crate::manifest::XmlDocument;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names probed in each directory, first match wins
pub const CONFIG_FILE_NAMES: &[&str] = &["nuget.config", "NuGet.config", "NuGet.Config"];

const PACKAGE_SOURCES: &str = "packageSources";
const DISABLED_PACKAGE_SOURCES: &str = "disabledPackageSources";

/// Resolves the ordered list of package sources for a directory
#[derive(Debug, Clone)]
pub struct SourceLoader {
    user_config: Option<PathBuf>,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader {
    /// Loader that includes the current user's `NuGet.Config`
    pub fn new() -> Self {
        Self {
            user_config: user_config_path(),
        }
    }

    /// Loader with an explicit (or no) user-level file
    pub fn with_user_config(user_config: Option<PathBuf>) -> Self {
        Self { user_config }
    }

    fn has_user_config(&self) -> bool {
        self.user_config.as_ref().is_some_and(|path| path.is_file())
    }

    /// Configuration files that apply to `directory`, lowest priority first
    pub fn config_files(&self, directory: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Some(user) = self.user_config.as_ref().filter(|_| self.has_user_config()) {
            files.push(user.clone());
        }

        let mut local: Vec<PathBuf> = directory
            .ancestors()
            .filter_map(|dir| {
                CONFIG_FILE_NAMES
                    .iter()
                    .map(|name| dir.join(name))
                    .find(|path| path.is_file())
            })
            .collect();
        local.reverse();

        for path in local {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        files
    }

    /// All configured sources, including disabled ones
    ///
    /// Without a user-level file, nuget.org is the implicit first source,
    /// so a repository file only drops it with `<clear/>`.
    pub fn load(&self, directory: &Path) -> Result<Vec<PackageSource>, ConfigError> {
        let files = self.config_files(directory);

        let mut layers = SourceLayers::default();
        if !self.has_user_config() {
            debug!(directory = %directory.display(), "no user NuGet config, starting from nuget.org");
            layers.sources.push(PackageSource::nuget_org());
        }
        for path in &files {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            debug!(path = %path.display(), "applying NuGet config");
            let base = path.parent().unwrap_or(Path::new("."));
            layers.apply(&content, base).map_err(|message| ConfigError::InvalidConfig {
                path: path.clone(),
                message,
            })?;
        }
        Ok(layers.finish())
    }

    /// Enabled sources only, in priority order
    pub fn enabled_sources(&self, directory: &Path) -> Result<Vec<PackageSource>, ConfigError> {
        Ok(self
            .load(directory)?
            .into_iter()
            .filter(|s| s.enabled)
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Sources,
    Disabled,
}

/// Accumulated state while applying configuration files
#[derive(Debug, Default)]
struct SourceLayers {
    sources: Vec<PackageSource>,
    disabled: Vec<(String, bool)>,
}

impl SourceLayers {
    fn apply(&mut self, content: &str, base: &Path) -> Result<(), String> {
        let document = XmlDocument::parse(content).map_err(|e| e.to_string())?;

        let mut section: Option<(Section, usize)> = None;
        for element in document.elements() {
            if section.is_some_and(|(_, depth)| element.depth <= depth) {
                section = None;
            }

            let name = element.local_name();
            match section {
                None => {
                    section = match name {
                        PACKAGE_SOURCES => Some((Section::Sources, element.depth)),
                        DISABLED_PACKAGE_SOURCES => Some((Section::Disabled, element.depth)),
                        _ => None,
                    };
                }
                Some((kind, depth)) if element.depth == depth + 1 => match (kind, name) {
                    (Section::Sources, "clear") => self.sources.clear(),
                    (Section::Sources, "add") => {
                        let (Some(key), Some(value)) =
                            (element.attribute("key"), element.attribute("value"))
                        else {
                            return Err("<add> in packageSources requires key and value".to_string());
                        };
                        self.add_source(key, &resolve_location(value, base));
                    }
                    (Section::Disabled, "clear") => self.disabled.clear(),
                    (Section::Disabled, "add") => {
                        if let Some(key) = element.attribute("key") {
                            let disabled = element
                                .attribute("value")
                                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
                            self.disabled.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
                            self.disabled.push((key.to_string(), disabled));
                        }
                    }
                    _ => {}
                },
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn add_source(&mut self, key: &str, url: &str) {
        match self
            .sources
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(key))
        {
            Some(existing) => existing.url = url.to_string(),
            None => self.sources.push(PackageSource::new(key, url)),
        }
    }

    fn finish(self) -> Vec<PackageSource> {
        let disabled = self.disabled;
        self.sources
            .into_iter()
            .map(|mut source| {
                source.enabled = !disabled
                    .iter()
                    .any(|(key, off)| *off && key.eq_ignore_ascii_case(&source.name));
                source
            })
            .collect()
    }
}

/// Local feed paths are relative to the file that declares them
fn resolve_location(value: &str, base: &Path) -> String {
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return value.to_string();
    }
    let path = Path::new(value);
    if path.is_absolute() {
        value.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

fn user_config_path() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("NuGet").join("NuGet.Config"))
    } else {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".nuget")
                .join("NuGet")
                .join("NuGet.Config")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn loader() -> SourceLoader {
        SourceLoader::with_user_config(None)
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_no_config_defaults_to_nuget_org() {
        let temp = TempDir::new().unwrap();
        let sources = loader().load(temp.path()).unwrap();
        assert_eq!(sources, vec![PackageSource::nuget_org()]);
    }

    #[test]
    fn test_nearest_file_overrides_ancestor() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("repo").join("src");
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration>
  <packageSources>
    <add key="nuget.org" value="https://api.nuget.org/v3/index.json" />
    <add key="company" value="https://old.example.com/index.json" />
  </packageSources>
</configuration>"#,
        );
        write(
            &child,
            "nuget.config",
            r#"<configuration>
  <packageSources>
    <add key="Company" value="https://new.example.com/index.json" />
    <add key="extra" value="https://extra.example.com/index.json" />
  </packageSources>
</configuration>"#,
        );

        let sources = loader().load(&child).unwrap();
        let urls: Vec<_> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.nuget.org/v3/index.json",
                "https://new.example.com/index.json",
                "https://extra.example.com/index.json"
            ]
        );
    }

    #[test]
    fn test_clear_drops_inherited_sources() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("repo");
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration><packageSources><add key="a" value="https://a.example.com/index.json" /></packageSources></configuration>"#,
        );
        write(
            &child,
            "NuGet.Config",
            r#"<configuration><packageSources><clear /><add key="b" value="https://b.example.com/index.json" /></packageSources></configuration>"#,
        );

        let sources = loader().load(&child).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "b");
    }

    #[test]
    fn test_disabled_sources() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration>
  <packageSources>
    <add key="a" value="https://a.example.com/index.json" />
    <add key="b" value="https://b.example.com/index.json" />
  </packageSources>
  <disabledPackageSources>
    <add key="A" value="true" />
    <add key="b" value="false" />
  </disabledPackageSources>
</configuration>"#,
        );

        let all = loader().load(temp.path()).unwrap();
        assert_eq!(all[0], PackageSource::nuget_org());
        assert!(!all[1].enabled);
        assert!(all[2].enabled);

        let enabled = loader().enabled_sources(temp.path()).unwrap();
        let names: Vec<_> = enabled.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["nuget.org", "b"]);
    }

    #[test]
    fn test_add_outside_package_sources_is_ignored() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration>
  <config><add key="globalPackagesFolder" value="packages" /></config>
  <packageSources><clear /><add key="a" value="https://a.example.com/index.json" /></packageSources>
</configuration>"#,
        );

        let sources = loader().load(temp.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "a");
    }

    #[test]
    fn test_relative_local_feed_resolved_against_config_dir() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration><packageSources><add key="local" value="feed" /></packageSources></configuration>"#,
        );

        let sources = loader().load(temp.path()).unwrap();
        assert_eq!(
            PathBuf::from(&sources[1].url),
            temp.path().join("feed")
        );
    }

    #[test]
    fn test_repo_config_without_clear_keeps_nuget_org() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "nuget.config",
            r#"<configuration><packageSources><add key="company" value="https://company.example.com/index.json" /></packageSources></configuration>"#,
        );

        let sources = loader().load(temp.path()).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["nuget.org", "company"]);

        let missing_user = temp.path().join("nowhere").join("NuGet.Config");
        let sources = SourceLoader::with_user_config(Some(missing_user))
            .load(temp.path())
            .unwrap();
        assert_eq!(sources[0], PackageSource::nuget_org());
    }

    #[test]
    fn test_user_config_has_lowest_priority() {
        let temp = TempDir::new().unwrap();
        let user = write(
            &temp.path().join("user"),
            "NuGet.Config",
            r#"<configuration><packageSources><add key="shared" value="https://user.example.com/index.json" /></packageSources></configuration>"#,
        );
        let repo = temp.path().join("repo");
        write(
            &repo,
            "nuget.config",
            r#"<configuration><packageSources><add key="shared" value="https://repo.example.com/index.json" /></packageSources></configuration>"#,
        );

        let sources = SourceLoader::with_user_config(Some(user)).load(&repo).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://repo.example.com/index.json");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "nuget.config", "<configuration><packageSources><!-- oops");
        let err = loader().load(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { .. }));
    }
}
