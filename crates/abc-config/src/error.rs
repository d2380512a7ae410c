//! Error types for configuration operations.

use abc_spatial::SpatialError;
use thiserror::Error;

/// Errors that can occur while loading a rig or building its processors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Factory rig not found
    #[error("rig not found: {0}")]
    RigNotFound(String),

    /// A section the requested processor needs is absent
    #[error("rig has no [{0}] section")]
    MissingSection(&'static str),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The spatial crate refused the settings
    #[error("failed to build processor: {0}")]
    Spatial(#[from] SpatialError),
}
