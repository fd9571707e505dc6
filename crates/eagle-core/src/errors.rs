//! Cross-cutting error types for Eagle.
//!
//! Domain-specific errors (`SchemaError`, `DatabaseError`, `ConfigError`) are
//! defined in their respective crates. The binary converges them via `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Eagle crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
