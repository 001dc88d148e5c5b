//! Recursive file discovery
//!
//! Walks a directory tree and collects matching files. Entries that cannot be
//! read (typically access-denied subtrees) are logged and skipped so the rest
//! of the tree is still visited.

use crate::error::IoError;
use crate::manifest::is_project_file;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const SOLUTION_EXTENSIONS: &[&str] = &["sln", "slnx"];

/// All files under `root` accepted by `predicate`, in a stable order
pub fn find_files(root: &Path, predicate: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                match e.into_io_error() {
                    Some(source) => {
                        debug!(error = %IoError::from_io(path, source), "skipping unreadable entry")
                    }
                    None => debug!(path = %path.display(), "skipping symlink loop"),
                }
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && predicate(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Returns true for `.sln` and `.slnx` files
pub fn is_solution_file(path: &Path) -> bool {
    has_extension(path, SOLUTION_EXTENSIONS)
}

/// Solution files under `root`: every `.sln` first, then every `.slnx`
pub fn find_solutions(root: &Path) -> Vec<PathBuf> {
    let mut solutions = find_files(root, is_solution_file);
    solutions.sort_by_key(|path| !has_extension(path, &["sln"]));
    solutions
}

/// Project files (`.csproj`, `.fsproj`, `.vbproj`) under `root`
pub fn find_projects(root: &Path) -> Vec<PathBuf> {
    find_files(root, is_project_file)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}
