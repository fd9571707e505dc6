use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

/// News items shown on the public landing page.
#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("headline", FieldDescriptor::string())
            .field("content", FieldDescriptor::string())
            .field("dateAdded", FieldDescriptor::date())
            .field("dateUpdated", FieldDescriptor::date())
            .field("project", FieldDescriptor::reference("Project"))
            .field("type", FieldDescriptor::string())
            .field("pinned", FieldDescriptor::boolean().with_default(false))
            .field("active", FieldDescriptor::boolean().with_default(true))
            .field("priority", FieldDescriptor::number().with_default(2))
            .field("contentUrl", FieldDescriptor::string())
            .field("documentUrl", FieldDescriptor::string()),
    )
}
