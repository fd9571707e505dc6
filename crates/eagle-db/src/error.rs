//! Database error types for eagle-db.

use eagle_core::errors::CoreError;
use eagle_schema::SchemaError;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unusable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A document that should exist does not.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// No entity is registered under this name.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// A pre-save hook refused the write.
    #[error("Save of {entity} rejected: {reason}")]
    Rejected { entity: String, reason: String },

    /// Malformed partial-update payload.
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// Malformed query filter.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Dropping a text index that does not exist.
    #[error("Text index not found for location '{0}'")]
    IndexNotFound(String),

    /// A location name that cannot be used inside SQL identifiers.
    #[error("Invalid location name '{0}'")]
    InvalidIdentifier(String),

    /// Schema validation or lookup failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
