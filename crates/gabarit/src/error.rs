//! Error types for rendering.

use gabarit_carton::CapacityError;
use gabarit_croquis::ConfigError;
use thiserror::Error;

/// Errors raised while preparing or running a render
#[derive(Debug, Error)]
pub enum RenderError {
    /// A helper was called with arguments but is not registered
    #[error("Missing helper: \"{name}\"")]
    MissingHelper { name: String },

    /// Invalid scope options
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A bounded map ran out of probe slots
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
