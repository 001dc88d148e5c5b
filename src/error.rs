//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading, parsing or writing manifest and project files
//! - RegistryError: Issues with package source communication
//! - ConfigError: Issues with CLI options and package source configuration
//! - ProcessError: External tool invocations that failed or timed out
//! - IoError: File system operation failures

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package source related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// External process errors
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to manifest and project file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Markup could not be tokenized
    #[error("malformed markup in {path} at byte {offset}: {message}")]
    MalformedMarkup {
        path: PathBuf,
        offset: usize,
        message: String,
    },

    /// Document has no root element
    #[error("no root element in {path}")]
    MissingRoot { path: PathBuf },
}

/// Errors related to package source communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in source
    #[error("package '{package}' not found in {source_name}")]
    PackageNotFound {
        package: String,
        source_name: String,
    },

    /// Network request failed
    #[error("failed to fetch '{package}' from {source_name}: {message}")]
    NetworkError {
        package: String,
        source_name: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {source_name}")]
    RateLimitExceeded { source_name: String },

    /// Invalid response from source
    #[error("invalid response from {source_name} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        source_name: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {source_name}")]
    Timeout {
        package: String,
        source_name: String,
    },

    /// Service index lacks a resource the client needs
    #[error("{source_name} does not expose a {resource} resource")]
    MissingResource {
        source_name: String,
        resource: String,
    },

    /// Source URL is neither an HTTP endpoint nor a local directory
    #[error("unsupported package source {source_name}: {url}")]
    UnsupportedSource { source_name: String, url: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Target directory does not exist
    #[error("target directory does not exist: {path}")]
    MissingTarget { path: PathBuf },

    /// Failed to read a package source configuration file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Package source configuration is malformed
    #[error("invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
}

/// Errors from external tool invocations
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Process could not be started
    #[error("failed to start `{command}` in {directory}: {source}")]
    Spawn {
        command: String,
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process exceeded its timeout budget and was killed
    #[error("`{command}` timed out after {}s in {directory}", .timeout.as_secs())]
    Timeout {
        command: String,
        directory: PathBuf,
        timeout: Duration,
    },

    /// Process exited with a non-zero code
    #[error("`{command}` exited with {} in {directory}\nstderr: {stderr}\nstdout: {stdout}", .exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    NonZeroExit {
        command: String,
        directory: PathBuf,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Permission denied
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new MalformedMarkup error
    pub fn malformed(path: impl Into<PathBuf>, offset: usize, message: impl Into<String>) -> Self {
        ManifestError::MalformedMarkup {
            path: path.into(),
            offset,
            message: message.into(),
        }
    }

    /// Attaches a file path to an error produced while parsing in-memory text
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match self {
            ManifestError::MalformedMarkup {
                offset, message, ..
            } => ManifestError::MalformedMarkup {
                path,
                offset,
                message,
            },
            ManifestError::MissingRoot { .. } => ManifestError::MissingRoot { path },
            other => other,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, source_name: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            source_name: source_name.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(source_name: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            source_name: source_name.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, source_name: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            source_name: source_name.into(),
        }
    }

    /// Returns true when the error only means the package does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::PackageNotFound { .. })
    }
}

impl ProcessError {
    /// Returns true if the process was killed for exceeding its timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout { .. })
    }
}

impl IoError {
    /// Creates a new DirectoryNotFound error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        IoError::DirectoryNotFound { path: path.into() }
    }

    /// Creates a new PermissionDenied error
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        IoError::PermissionDenied { path: path.into() }
    }

    /// Creates a new Generic IO error
    pub fn generic(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Generic {
            path: path.into(),
            source,
        }
    }

    /// Classify an IO error by kind
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::directory_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::generic(path, source),
        }
    }
}
