//! Error types for map generation

use thiserror::Error;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapGenError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Generation failed because an internal stage broke an invariant
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
}

/// Result type alias for map generation operations
pub type Result<T> = std::result::Result<T, MapGenError>;
