//! Error types for hook-repo.
//!
//! This module defines all errors that can occur while fetching, installing
//! and running hook repositories. A hook that exits non-zero is *not* an
//! error: its outcome is returned as [`CommandOutput`](crate::core::executor::CommandOutput).

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in hook-repo.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Fetch errors
    // =========================================================================
    /// Cloning a hook repository failed.
    #[error("Failed to clone {location}: {message}")]
    CloneFailed {
        /// Remote location of the repository.
        location: String,
        /// Error message from the version-control tool.
        message: String,
    },

    /// Checking out the pinned version of a hook repository failed.
    #[error("Failed to fetch {location} at {version}: {message}")]
    Fetch {
        /// Remote location of the repository.
        location: String,
        /// Version pin that was requested.
        version: String,
        /// Error message from the version-control tool.
        message: String,
    },

    // =========================================================================
    // Manifest errors
    // =========================================================================
    /// The repository has no manifest file.
    #[error("Manifest not found: {path}")]
    ManifestNotFound {
        /// Path where the manifest was expected.
        path: PathBuf,
    },

    /// The manifest file is not valid YAML or has the wrong shape.
    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse {
        /// Path of the manifest.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The manifest parsed but its contents are inconsistent.
    #[error("Invalid manifest {path}: {message}")]
    ManifestInvalid {
        /// Path of the manifest.
        path: PathBuf,
        /// Why it's invalid.
        message: String,
    },

    /// A configured hook id is not declared by the repository's manifest.
    #[error("Hook '{id}' is not present in repository {location}")]
    MissingManifestHook {
        /// Hook id from the configuration.
        id: String,
        /// Repository that was searched.
        location: String,
    },

    // =========================================================================
    // Language errors
    // =========================================================================
    /// No backend is registered under the given language name.
    #[error("Unknown language: {language}")]
    UnknownLanguage {
        /// Language name that wasn't found.
        language: String,
    },

    /// Installing a language environment failed.
    #[error("Failed to install {language} environment: {message}")]
    Install {
        /// Language being installed.
        language: String,
        /// Error message or output.
        message: String,
    },

    // =========================================================================
    // Hook errors
    // =========================================================================
    /// Hook not found in the effective hook set.
    #[error("Hook not found: {id}")]
    HookNotFound {
        /// Id of the hook that wasn't found.
        id: String,
    },

    /// Command not found.
    #[error("Command not found: {command}")]
    CommandNotFound {
        /// The command that wasn't found.
        command: String,
    },

    // =========================================================================
    // Git errors
    // =========================================================================
    /// Not in a Git repository.
    #[error("Not in a Git repository")]
    NotGitRepo,

    /// Git operation failed.
    #[error("Git operation failed: {operation} - {message}")]
    GitOperation {
        /// Name of the operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration validation error.
    pub fn config_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new manifest parse error with source.
    pub fn manifest_parse(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ManifestParse {
            path: path.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new manifest validation error.
    pub fn manifest_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new clone error.
    pub fn clone_failed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CloneFailed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Creates a new fetch error.
    pub fn fetch(
        location: impl Into<String>,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            location: location.into(),
            version: version.into(),
            message: message.into(),
        }
    }

    /// Creates a new install error.
    pub fn install(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Install {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new Git operation error.
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GitOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error comes from a manifest or from matching
    /// configured hooks against one.
    pub const fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound { .. }
                | Self::ManifestParse { .. }
                | Self::ManifestInvalid { .. }
                | Self::MissingManifestHook { .. }
        )
    }

    /// Returns true if this is a user-correctable error.
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::MissingManifestHook { .. }
                | Self::HookNotFound { .. }
                | Self::UnknownLanguage { .. }
                | Self::NotGitRepo
        )
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                78
            }, // EX_CONFIG
            Self::ManifestNotFound { .. }
            | Self::ManifestParse { .. }
            | Self::ManifestInvalid { .. }
            | Self::MissingManifestHook { .. }
            | Self::NotGitRepo
            | Self::GitOperation { .. } => 65, // EX_DATAERR
            Self::CloneFailed { .. } | Self::Fetch { .. } => 69, // EX_UNAVAILABLE
            _ => 1,
        }
    }
}
