//! Error type shared by grid construction, configuration and field I/O.
//!
//! The differentiation core itself is infallible; only the code that builds
//! a context or moves a field in and out of storage returns [`RftError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RftError {
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("field length mismatch: expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("grid header parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("NIfTI error: {0}")]
    Nifti(String),
}

pub type Result<T> = std::result::Result<T, RftError>;
