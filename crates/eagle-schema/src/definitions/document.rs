use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

/// Uploaded file metadata. The file itself lives in object storage.
#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("project", FieldDescriptor::reference("Project").indexed())
            .field("documentFileName", FieldDescriptor::string())
            .field("displayName", FieldDescriptor::string())
            .field("internalURL", FieldDescriptor::string())
            .field("internalOriginalName", FieldDescriptor::string())
            .field("internalMime", FieldDescriptor::string())
            .field("internalSize", FieldDescriptor::number())
            .field("documentSource", FieldDescriptor::string().with_default("PROJECT"))
            .field("documentAuthor", FieldDescriptor::string())
            .field("description", FieldDescriptor::string())
            .field("datePosted", FieldDescriptor::date())
            .field("type", FieldDescriptor::reference("List"))
            .field("milestone", FieldDescriptor::reference("List"))
            .field("keywords", FieldDescriptor::string())
            .field("isPublished", FieldDescriptor::boolean().with_default(false)),
    )
    .pre_save(default_display_name)
}

fn default_display_name(doc: &mut Document) -> Result<(), String> {
    let blank = doc.get_str("displayName").is_none_or(str::is_empty);
    if blank {
        if let Some(file_name) = doc.get_str("documentFileName").map(String::from) {
            doc.set("displayName", file_name);
        }
    }
    Ok(())
}
