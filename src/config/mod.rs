//! Configuration: package source layering and solution exclusions

mod ignore;
mod nuget;

pub use ignore::{Excluder, IGNORE_ENV_VAR};
pub use nuget::{SourceLoader, CONFIG_FILE_NAMES};
