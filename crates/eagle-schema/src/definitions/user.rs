use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;
use serde_json::Value;

use super::with_permissions;
use crate::definition::{EntityDefinition, VirtualField};

/// Staff and proponent contacts. `fullName` is a virtual over the name parts.
#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("firstName", FieldDescriptor::string())
            .field("middleName", FieldDescriptor::string())
            .field("lastName", FieldDescriptor::string())
            .field("displayName", FieldDescriptor::string())
            .field("email", FieldDescriptor::string().indexed())
            .field("username", FieldDescriptor::string())
            .field("idirUserGuid", FieldDescriptor::string())
            .field("org", FieldDescriptor::reference("Organization"))
            .field("orgName", FieldDescriptor::string())
            .field("title", FieldDescriptor::string())
            .field("phoneNumber", FieldDescriptor::string())
            .field("salutation", FieldDescriptor::string())
            .field("notes", FieldDescriptor::string()),
    )
    .virtual_field(
        VirtualField::new("fullName")
            .getter(full_name)
            .setter(set_full_name),
    )
}

fn full_name(doc: &Document) -> Value {
    let parts: Vec<&str> = ["firstName", "middleName", "lastName"]
        .into_iter()
        .filter_map(|key| doc.get_str(key))
        .filter(|part| !part.is_empty())
        .collect();
    Value::String(parts.join(" "))
}

/// First word becomes `firstName`, last word `lastName`, anything between `middleName`.
fn set_full_name(doc: &mut Document, value: Value) {
    let Some(text) = value.as_str() else {
        return;
    };
    let words: Vec<&str> = text.split_whitespace().collect();
    let (first, middle, last) = match words.as_slice() {
        [] => ("", String::new(), ""),
        [only] => (*only, String::new(), ""),
        [first, middle @ .., last] => (*first, middle.join(" "), *last),
    };
    doc.set("firstName", first);
    doc.set("middleName", middle);
    doc.set("lastName", last);
}
