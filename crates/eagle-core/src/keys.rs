//! Reserved field names and defaults.
//!
//! Every registered entity carries `schemaName` and `version`. All entities
//! except the audit entity also carry the three actor fields.

/// Document identifier key inside a stored body and in filters.
pub const ID: &str = "_id";

/// Logical entity name, injected into every schema and indexed.
pub const SCHEMA_NAME: &str = "schemaName";

/// Monotonic update counter. Never client-settable.
pub const VERSION: &str = "version";

pub const CREATED_BY: &str = "_createdBy";
pub const UPDATED_BY: &str = "_updatedBy";
pub const DELETED_BY: &str = "_deletedBy";

/// Actor recorded when the caller does not supply one.
pub const DEFAULT_ACTOR: &str = "system";

/// Actor fields injected into every non-audit entity, in declaration order.
pub const ACTOR_FIELDS: [&str; 3] = [CREATED_BY, UPDATED_BY, DELETED_BY];

/// Default name of the audit entity.
pub const AUDIT_ENTITY: &str = "Audit";
