use eagle_core::field::FieldDescriptor;

use super::with_permissions;
use crate::definition::EntityDefinition;

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("name", FieldDescriptor::string().indexed())
            .field("description", FieldDescriptor::string())
            .field("companyType", FieldDescriptor::string())
            .field("parentCompany", FieldDescriptor::reference("Organization"))
            .field("companyLegal", FieldDescriptor::string())
            .field("address1", FieldDescriptor::string())
            .field("address2", FieldDescriptor::string())
            .field("city", FieldDescriptor::string())
            .field("province", FieldDescriptor::string())
            .field("postal", FieldDescriptor::string())
            .field("country", FieldDescriptor::string()),
    )
}
