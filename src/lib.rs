//! cpmup - NuGet package updater library
//!
//! This library provides the core functionality for keeping .NET solutions
//! on the latest package versions:
//! - Central manifests (Directory.Packages.props) updated with formatting preserved
//! - Deprecated packages migrated to their replacements
//! - Migrations propagated to project files
//! - Per-project updates through the `dotnet` CLI

pub mod cli;
pub mod config;
pub mod discover;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod process;
pub mod propagate;
pub mod registry;
pub mod update;
