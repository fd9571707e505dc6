use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

/// Pick-list entries (document types, milestones, phases) keyed by `type`.
#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("name", FieldDescriptor::string())
            .field("type", FieldDescriptor::string().indexed())
            .field("legislation", FieldDescriptor::number().with_default(2002))
            .field("listOrder", FieldDescriptor::number()),
    )
}
