//! CLI argument parsing module for cpmup

use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// Central package manifest updater for .NET solutions
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cpmup",
    version,
    about = "Updates NuGet packages of every solution under a directory"
)]
pub struct CliArgs {
    /// Target directory (default: current directory)
    #[arg(conflicts_with = "target_directory")]
    pub path: Option<PathBuf>,

    /// Target directory, alternative to the positional argument
    #[arg(short = 't', long, value_name = "DIR")]
    pub target_directory: Option<PathBuf>,

    /// Update only this package (case-insensitive)
    #[arg(short, long, value_name = "ID")]
    pub package: Option<String>,

    /// Build each solution after updating it
    #[arg(short, long)]
    pub build: bool,

    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Skip solutions whose path contains this text (can be specified multiple times)
    #[arg(long, value_name = "PATTERN", action = ArgAction::Append)]
    pub ignore: Vec<String>,
}

impl CliArgs {
    /// Directory to scan, absolute
    ///
    /// Relative paths are resolved against `current_dir`.
    pub fn target_directory(&self, current_dir: &Path) -> PathBuf {
        let target = self
            .target_directory
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(Path::new("."));
        if target.is_absolute() {
            target.to_path_buf()
        } else if target == Path::new(".") {
            current_dir.to_path_buf()
        } else {
            current_dir.join(target)
        }
    }

    /// Default log filter for the selected verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["cpmup"]);
        assert!(args.path.is_none());
        assert!(args.target_directory.is_none());
        assert!(args.package.is_none());
        assert!(!args.build);
        assert!(!args.dry_run);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.json);
        assert!(args.ignore.is_empty());
    }

    #[test]
    fn test_positional_path() {
        let args = CliArgs::parse_from(["cpmup", "/some/path"]);
        assert_eq!(args.target_directory(Path::new("/cwd")), PathBuf::from("/some/path"));
    }

    #[test]
    fn test_target_directory_flag() {
        let args = CliArgs::parse_from(["cpmup", "-t", "repo"]);
        assert_eq!(args.target_directory(Path::new("/cwd")), PathBuf::from("/cwd/repo"));

        let args = CliArgs::parse_from(["cpmup", "--target-directory", "/abs"]);
        assert_eq!(args.target_directory(Path::new("/cwd")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_default_target_is_current_dir() {
        let args = CliArgs::parse_from(["cpmup"]);
        assert_eq!(args.target_directory(Path::new("/cwd")), PathBuf::from("/cwd"));
    }

    #[test]
    fn test_path_and_target_directory_conflict() {
        let result = CliArgs::try_parse_from(["cpmup", "a", "-t", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_package_and_build_flags() {
        let args = CliArgs::parse_from(["cpmup", "-p", "Newtonsoft.Json", "-b"]);
        assert_eq!(args.package.as_deref(), Some("Newtonsoft.Json"));
        assert!(args.build);

        let args = CliArgs::parse_from(["cpmup", "--package", "Foo", "--build"]);
        assert_eq!(args.package.as_deref(), Some("Foo"));
        assert!(args.build);
    }

    #[test]
    fn test_dry_run_flags() {
        assert!(CliArgs::parse_from(["cpmup", "-n"]).dry_run);
        assert!(CliArgs::parse_from(["cpmup", "--dry-run"]).dry_run);
    }

    #[test]
    fn test_ignore_multiple() {
        let args = CliArgs::parse_from(["cpmup", "--ignore", "Legacy", "--ignore", "samples"]);
        assert_eq!(args.ignore, vec!["Legacy", "samples"]);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(CliArgs::parse_from(["cpmup"]).log_level(), "info");
        assert_eq!(CliArgs::parse_from(["cpmup", "--verbose"]).log_level(), "debug");
        assert_eq!(CliArgs::parse_from(["cpmup", "-q"]).log_level(), "warn");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(CliArgs::try_parse_from(["cpmup", "--verbose", "-q"]).is_err());
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from(["cpmup", "-n", "--json", "-p", "Foo", "repo"]);
        assert!(args.dry_run);
        assert!(args.json);
        assert_eq!(args.package.as_deref(), Some("Foo"));
        assert_eq!(args.path, Some(PathBuf::from("repo")));
    }
}
