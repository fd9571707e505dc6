//! Explicit registry of entity schemas.
//!
//! Owned by the bootstrap sequence and shared by reference (`Arc`) with the
//! store once registration is finished. There is no process-wide state.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::definition::EntityDefinition;
use crate::error::SchemaError;
use crate::factory::{self, AuditBinding};
use crate::hooks::AuditSink;
use crate::schema::EntitySchema;

/// Name → schema map plus the audit wiring every registration shares.
pub struct EntityRegistry {
    schemas: HashMap<String, Arc<EntitySchema>>,
    audit_entity: String,
    audit_sink: Arc<dyn AuditSink>,
}

impl EntityRegistry {
    /// Create an empty registry. `audit_entity` names the entity that stores
    /// audit records; every other entity audits its saves into `audit_sink`.
    #[must_use]
    pub fn new(audit_entity: impl Into<String>, audit_sink: Arc<dyn AuditSink>) -> Self {
        Self {
            schemas: HashMap::new(),
            audit_entity: audit_entity.into(),
            audit_sink,
        }
    }

    /// Register an entity and return its handle.
    ///
    /// Re-registering a name with the same structure (fields and storage
    /// location) returns the existing handle. A different structure is a
    /// conflict and leaves the existing registration in place.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MissingName`, `MissingDefinition` or
    /// `MissingLocation` for incomplete input, and `SchemaError::Conflict` for
    /// a conflicting re-registration.
    pub fn register(
        &mut self,
        name: &str,
        definition: EntityDefinition,
        storage_location: &str,
    ) -> Result<Arc<EntitySchema>, SchemaError> {
        let binding = AuditBinding {
            entity_name: &self.audit_entity,
            sink: &self.audit_sink,
        };
        let schema = factory::build(name, definition, storage_location, &binding)?;

        if let Some(existing) = self.schemas.get(name) {
            if existing.structure() == schema.structure() {
                tracing::debug!(entity = name, "entity already registered; reusing");
                return Ok(Arc::clone(existing));
            }
            tracing::error!(entity = name, "conflicting entity re-registration");
            return Err(SchemaError::Conflict(name.to_string()));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(name.to_string(), Arc::clone(&schema));
        tracing::debug!(entity = name, location = storage_location, "entity registered");
        Ok(schema)
    }

    /// Get a schema by name. Returns `None` if not registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Schemas persisting into `location`, sorted by name.
    #[must_use]
    pub fn in_location(&self, location: &str) -> Vec<Arc<EntitySchema>> {
        let mut schemas: Vec<Arc<EntitySchema>> = self
            .schemas
            .values()
            .filter(|s| s.storage_location() == location)
            .cloned()
            .collect();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));
        schemas
    }

    /// Every distinct storage location in use.
    #[must_use]
    pub fn locations(&self) -> BTreeSet<&str> {
        self.schemas.values().map(|s| s.storage_location()).collect()
    }

    #[must_use]
    pub fn audit_entity(&self) -> &str {
        &self.audit_entity
    }

    /// The registered audit schema, if it has been registered.
    #[must_use]
    pub fn audit_schema(&self) -> Option<Arc<EntitySchema>> {
        self.get(&self.audit_entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
