use eagle_core::field::FieldDescriptor;

use crate::definition::EntityDefinition;

/// Audit record. Registered under the configured audit entity name.
#[must_use]
pub fn definition() -> EntityDefinition {
    EntityDefinition::new()
        .field("objectSchemaName", FieldDescriptor::string().indexed())
        .field("objectId", FieldDescriptor::string().indexed())
        .field("updatedBy", FieldDescriptor::string())
        .field("addedBy", FieldDescriptor::string())
        .field("timestamp", FieldDescriptor::date())
}
