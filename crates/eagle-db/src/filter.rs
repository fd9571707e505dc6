//! Equality filters for document queries.
//!
//! A filter is a set of `field == value` conditions, all of which must hold.
//! `_id` matches the document id. An array field matches a scalar condition
//! if any element equals it. Operators (`$gt`, `$in`, ...) are not supported.

use std::collections::BTreeMap;

use eagle_core::document::Document;
use eagle_core::keys;
use serde_json::{Map, Value};

use crate::error::DatabaseError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Value>,
}

impl Filter {
    /// Match every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by_id(id: &str) -> Self {
        Self::all().where_eq(keys::ID, id)
    }

    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.to_string(), value.into());
        self
    }

    /// Parse a JSON filter object such as `{"project": "abc", "isPublished": true}`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidFilter` for non-objects and operator keys.
    pub fn from_value(value: Value) -> Result<Self, DatabaseError> {
        let Value::Object(map) = value else {
            return Err(DatabaseError::InvalidFilter(format!(
                "filter must be an object, got {value}"
            )));
        };
        Self::from_map(map)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidFilter` for operator keys or values.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, DatabaseError> {
        let mut conditions = BTreeMap::new();
        for (key, value) in map {
            if key.starts_with('$') {
                return Err(DatabaseError::InvalidFilter(format!(
                    "unsupported operator '{key}'"
                )));
            }
            if let Value::Object(inner) = &value {
                if let Some(op) = inner.keys().find(|k| k.starts_with('$')) {
                    return Err(DatabaseError::InvalidFilter(format!(
                        "unsupported operator '{op}' on '{key}'"
                    )));
                }
            }
            conditions.insert(key, value);
        }
        Ok(Self { conditions })
    }

    /// The `_id` condition, if it is a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.conditions.get(keys::ID).and_then(Value::as_str)
    }

    /// Field conditions other than `_id`, used to seed upserted documents.
    pub fn field_conditions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.conditions.iter().filter(|(key, _)| key.as_str() != keys::ID)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|(key, expected)| {
            if key == keys::ID {
                return doc.id().is_some_and(|id| Some(id) == expected.as_str());
            }
            match (doc.get(key), expected) {
                (Some(Value::Array(items)), scalar) if !scalar.is_array() => items.contains(scalar),
                (Some(actual), expected) => actual == expected,
                (None, Value::Null) => true,
                (None, _) => false,
            }
        })
    }
}
