use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("period", FieldDescriptor::reference("CommentPeriod").indexed())
            .field("commentId", FieldDescriptor::number())
            .field("author", FieldDescriptor::string())
            .field("comment", FieldDescriptor::string())
            .field("location", FieldDescriptor::string())
            .field("eaoNotes", FieldDescriptor::string())
            .field("eaoStatus", FieldDescriptor::string().with_default("Pending"))
            .field("proponentNotes", FieldDescriptor::string())
            .field("isAnonymous", FieldDescriptor::boolean().with_default(true))
            .field("dateAdded", FieldDescriptor::date())
            .field("documents", FieldDescriptor::array().with_default(serde_json::json!([]))),
    )
}
