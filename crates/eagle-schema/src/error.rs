//! Schema error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Registration was attempted without an entity name.
    #[error("Entity registration requires a name")]
    MissingName,

    /// Registration was attempted without any declared fields.
    #[error("Entity '{0}' has no field definitions")]
    MissingDefinition(String),

    /// Registration was attempted without a storage location.
    #[error("Entity '{0}' has no storage location")]
    MissingLocation(String),

    /// The name is already registered with a different structure.
    #[error("Entity '{0}' is already registered with a different definition")]
    Conflict(String),

    /// No method with this name on the entity.
    #[error("Entity '{entity}' has no method '{method}'")]
    UnknownMethod { entity: String, method: String },

    /// No virtual with this name, or it lacks the requested accessor.
    #[error("Entity '{entity}' has no {accessor} for virtual '{name}'")]
    UnknownVirtual {
        entity: String,
        name: String,
        accessor: &'static str,
    },

    /// Building the JSON Schema validator failed.
    #[error("Schema generation failed: {0}")]
    Generation(String),

    /// A document body failed validation.
    #[error("Validation failed for '{entity}': {errors:?}")]
    ValidationFailed { entity: String, errors: Vec<String> },
}
