//! Built-in entity definition tables.
//!
//! Every entity except the audit entity shares one storage location
//! ([`SHARED_LOCATION`] by default), which is what lets a single text index
//! span projects, documents, users and activity. Audit records live apart.

mod audit;
mod comment;
mod comment_period;
mod document;
mod group;
mod list;
mod organization;
mod project;
mod recent_activity;
mod survey;
mod survey_response;
mod user;

use std::sync::Arc;

use crate::definition::EntityDefinition;
use crate::error::SchemaError;
use crate::registry::EntityRegistry;
use crate::schema::EntitySchema;

pub use audit::definition as audit;
pub use comment::definition as comment;
pub use comment_period::definition as comment_period;
pub use document::definition as document;
pub use group::definition as group;
pub use list::definition as list;
pub use organization::definition as organization;
pub use project::definition as project;
pub use recent_activity::definition as recent_activity;
pub use survey::definition as survey;
pub use survey_response::definition as survey_response;
pub use user::definition as user;

/// Default location shared by all non-audit entities.
pub const SHARED_LOCATION: &str = "epic";

/// Default location for audit records.
pub const AUDIT_LOCATION: &str = "audit";

/// Permission arrays carried by most entities.
pub(crate) const PERMISSION_FIELDS: [&str; 3] = ["read", "write", "delete"];

/// Default role granted every permission on new records.
pub(crate) const SYSADMIN: &str = "sysadmin";

/// Names and definitions of the shared-location entities, in registration order.
#[must_use]
pub fn shared_entities() -> Vec<(&'static str, EntityDefinition)> {
    vec![
        ("Organization", organization()),
        ("User", user()),
        ("Group", group()),
        ("List", list()),
        ("Project", project()),
        ("CommentPeriod", comment_period()),
        ("Comment", comment()),
        ("Document", document()),
        ("Survey", survey()),
        ("SurveyResponse", survey_response()),
        ("RecentActivity", recent_activity()),
    ]
}

/// Register the audit entity and every shared entity.
///
/// The audit definition is registered under the registry's audit entity name.
///
/// # Errors
///
/// Returns the first `SchemaError` encountered; earlier registrations stay.
pub fn register_builtin_entities(
    registry: &mut EntityRegistry,
    shared_location: &str,
    audit_location: &str,
) -> Result<Vec<Arc<EntitySchema>>, SchemaError> {
    let audit_name = registry.audit_entity().to_string();
    let mut registered = vec![registry.register(&audit_name, audit(), audit_location)?];
    for (name, definition) in shared_entities() {
        registered.push(registry.register(name, definition, shared_location)?);
    }
    tracing::info!(count = registered.len(), "built-in entities registered");
    Ok(registered)
}

/// Add `read`/`write`/`delete` arrays defaulting to `["sysadmin"]`.
pub(crate) fn with_permissions(mut definition: EntityDefinition) -> EntityDefinition {
    for key in PERMISSION_FIELDS {
        definition = definition.field(
            key,
            eagle_core::field::FieldDescriptor::array().with_default(serde_json::json!([SYSADMIN])),
        );
    }
    definition
}
