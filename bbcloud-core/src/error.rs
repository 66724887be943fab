//! Error types for billboard cloud generation

use thiserror::Error;

/// Main error type for billboard cloud operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input mesh has no triangles")]
    EmptyInput,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("A billboard cloud generation is already in progress")]
    Busy,

    #[error("Background generation ended without publishing a result")]
    Disconnected,
}

/// Result type alias for billboard cloud operations
pub type Result<T> = std::result::Result<T, Error>;
