use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;
use serde_json::Value;

use super::with_permissions;
use crate::definition::{EntityDefinition, IndexHint};

/// Role that makes a record visible to anonymous readers.
const PUBLIC: &str = "public";

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("name", FieldDescriptor::string().indexed())
            .field("code", FieldDescriptor::string().indexed())
            .field("description", FieldDescriptor::string())
            .field("type", FieldDescriptor::string())
            .field("sector", FieldDescriptor::string())
            .field("region", FieldDescriptor::string())
            .field("location", FieldDescriptor::string())
            .field("status", FieldDescriptor::string())
            .field("eacDecision", FieldDescriptor::string())
            .field("legislation", FieldDescriptor::string())
            .field("proponent", FieldDescriptor::reference("Organization"))
            .field("lead", FieldDescriptor::reference("User"))
            .field("responsibleEPD", FieldDescriptor::reference("User"))
            .field("currentPhaseName", FieldDescriptor::string())
            .field("centroid", FieldDescriptor::array().with_default(serde_json::json!([0, 0])))
            .field("dateAdded", FieldDescriptor::date())
            .field("dateUpdated", FieldDescriptor::date()),
    )
    .method("isPublished", is_published)
    .index_hint(IndexHint {
        fields: vec!["name".into(), "code".into()],
        unique: false,
    })
}

fn is_published(doc: &Document) -> Value {
    let published = doc
        .get("read")
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|role| role.as_str() == Some(PUBLIC)));
    Value::Bool(published)
}
