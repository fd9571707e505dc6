use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("survey", FieldDescriptor::reference("Survey").indexed())
            .field("period", FieldDescriptor::reference("CommentPeriod"))
            .field("project", FieldDescriptor::reference("Project"))
            .field("author", FieldDescriptor::string())
            .field("location", FieldDescriptor::string())
            .field("commentId", FieldDescriptor::number())
            .field("responses", FieldDescriptor::array().with_default(serde_json::json!([])))
            .field("documents", FieldDescriptor::array().with_default(serde_json::json!([])))
            .field("dateAdded", FieldDescriptor::date()),
    )
}
