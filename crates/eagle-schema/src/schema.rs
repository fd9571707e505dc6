//! The registered entity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;
use eagle_core::keys;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::definition::{IndexHint, Method, VirtualField};
use crate::error::SchemaError;
use crate::hooks::{PostSaveBehavior, PreSaveHook};

/// Structural view of a schema: what two registrations are compared on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaStructure {
    pub name: String,
    pub storage_location: String,
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// A registered entity, bound to its storage location.
///
/// Produced only by [`crate::EntityRegistry::register`]. Holds the normalized
/// field table (bookkeeping fields included), the compiled body validator,
/// and the resolved save behavior.
pub struct EntitySchema {
    pub(crate) structure: SchemaStructure,
    pub(crate) methods: BTreeMap<String, Method>,
    pub(crate) virtuals: Vec<VirtualField>,
    pub(crate) serialize_virtuals: bool,
    pub(crate) index_hints: Vec<IndexHint>,
    pub(crate) pre_save: Option<Arc<dyn PreSaveHook>>,
    pub(crate) post_save: PostSaveBehavior,
    pub(crate) is_audit: bool,
    pub(crate) json_schema: Value,
    pub(crate) validator: jsonschema::Validator,
}

impl EntitySchema {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.structure.name
    }

    #[must_use]
    pub fn storage_location(&self) -> &str {
        &self.structure.storage_location
    }

    #[must_use]
    pub const fn structure(&self) -> &SchemaStructure {
        &self.structure
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldDescriptor> {
        &self.structure.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.structure.fields.get(name)
    }

    #[must_use]
    pub fn indexed_fields(&self) -> Vec<&str> {
        self.structure
            .fields
            .iter()
            .filter(|(_, field)| field.indexed)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[must_use]
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn virtual_names(&self) -> Vec<&str> {
        self.virtuals.iter().map(|v| v.name.as_str()).collect()
    }

    /// Whether virtual getters appear in `to_object` / `to_json` output.
    #[must_use]
    pub const fn serializes_virtuals(&self) -> bool {
        self.serialize_virtuals
    }

    /// Reserved hints, kept for inspection only.
    #[must_use]
    pub fn index_hints(&self) -> &[IndexHint] {
        &self.index_hints
    }

    #[must_use]
    pub fn pre_save(&self) -> Option<&dyn PreSaveHook> {
        self.pre_save.as_deref()
    }

    #[must_use]
    pub const fn post_save(&self) -> &PostSaveBehavior {
        &self.post_save
    }

    #[must_use]
    pub const fn is_audit_entity(&self) -> bool {
        self.is_audit
    }

    /// The JSON Schema bodies of this entity are validated against.
    #[must_use]
    pub const fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    /// Normalize a body for writing: keep declared fields only, fill defaults
    /// for missing ones, and pin `schemaName` to this entity.
    ///
    /// `version` is left untouched; the store owns it.
    pub fn prepare_body(&self, body: &mut Map<String, Value>) {
        body.retain(|key, _| key == keys::VERSION || self.structure.fields.contains_key(key));
        for (name, field) in &self.structure.fields {
            if let Some(default) = &field.default {
                body.entry(name.clone()).or_insert_with(|| default.clone());
            }
        }
        body.insert(
            keys::SCHEMA_NAME.to_string(),
            Value::String(self.structure.name.clone()),
        );
    }

    /// Normalize a body produced by a partial update: drop undeclared keys and
    /// pin `schemaName`. Defaults are not filled; the document already exists.
    pub fn normalize_update(&self, body: &mut Map<String, Value>) {
        body.retain(|key, _| key == keys::VERSION || self.structure.fields.contains_key(key));
        body.insert(
            keys::SCHEMA_NAME.to_string(),
            Value::String(self.structure.name.clone()),
        );
    }

    /// Validate a body against the declared field types.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, body: &Map<String, Value>) -> Result<(), SchemaError> {
        let instance = Value::Object(body.clone());
        let errors: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                entity: self.structure.name.clone(),
                errors,
            })
        }
    }

    /// Pre-update interceptor, installed on every schema. See [`crate::version_guard`].
    pub fn before_update(&self, update: &mut Map<String, Value>) {
        crate::version_guard::guard_version(update);
    }

    /// Invoke a custom instance method.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownMethod` if no such method was declared.
    pub fn call(&self, method: &str, doc: &Document) -> Result<Value, SchemaError> {
        let f = self
            .methods
            .get(method)
            .ok_or_else(|| SchemaError::UnknownMethod {
                entity: self.structure.name.clone(),
                method: method.to_string(),
            })?;
        Ok(f(doc))
    }

    /// Read a virtual field.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownVirtual` if the virtual or its getter is missing.
    pub fn get_virtual(&self, name: &str, doc: &Document) -> Result<Value, SchemaError> {
        let get = self
            .virtuals
            .iter()
            .find(|v| v.name == name)
            .and_then(|v| v.get.as_ref())
            .ok_or_else(|| self.unknown_virtual(name, "getter"))?;
        Ok(get(doc))
    }

    /// Write through a virtual field's setter.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownVirtual` if the virtual or its setter is missing.
    pub fn set_virtual(&self, doc: &mut Document, name: &str, value: Value) -> Result<(), SchemaError> {
        let set = self
            .virtuals
            .iter()
            .find(|v| v.name == name)
            .and_then(|v| v.set.as_ref())
            .ok_or_else(|| self.unknown_virtual(name, "setter"))?;
        set(doc, value);
        Ok(())
    }

    /// Object representation: stored fields, `_id`, and virtual getter values
    /// when virtual serialization is enabled.
    #[must_use]
    pub fn to_object(&self, doc: &Document) -> Map<String, Value> {
        let mut map = doc.to_map();
        if self.serialize_virtuals {
            for field in &self.virtuals {
                if let Some(get) = &field.get {
                    map.insert(field.name.clone(), get(doc));
                }
            }
        }
        map
    }

    /// Interchange representation of [`Self::to_object`].
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if a virtual produced an unserializable value.
    pub fn to_json(&self, doc: &Document) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_object(doc))
    }

    fn unknown_virtual(&self, name: &str, accessor: &'static str) -> SchemaError {
        SchemaError::UnknownVirtual {
            entity: self.structure.name.clone(),
            name: name.to_string(),
            accessor,
        }
    }
}

impl fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.structure.name)
            .field("storage_location", &self.structure.storage_location)
            .field("fields", &self.structure.fields.keys().collect::<Vec<_>>())
            .field("post_save", &self.post_save)
            .field("is_audit", &self.is_audit)
            .finish_non_exhaustive()
    }
}
