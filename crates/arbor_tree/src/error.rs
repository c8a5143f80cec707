//! Error types for tree configuration and registration
//!
//! Commit attempts never fail with an error: declined transactions and
//! optimistic conflicts are retried, and running out of attempts is a
//! fatal invariant violation.

use arbor_core::SurfaceId;
use thiserror::Error;

/// Errors from loading or validating a [`crate::ShadowTreeConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from the shadow tree registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Surface {0} already has a shadow tree")]
    DuplicateSurface(SurfaceId),

    #[error("No shadow tree registered for surface {0}")]
    UnknownSurface(SurfaceId),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
