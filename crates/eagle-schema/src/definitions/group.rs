use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("name", FieldDescriptor::string())
            .field("project", FieldDescriptor::reference("Project").indexed())
            .field("members", FieldDescriptor::array().with_default(serde_json::json!([]))),
    )
}
