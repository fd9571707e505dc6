use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys;

/// One instance of a registered entity.
///
/// `body` holds every persisted field, including `schemaName` and `version`.
/// `id` is `None` until the document has been saved for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<String>,
    pub body: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Wrap an unsaved body.
    #[must_use]
    pub const fn new(body: Map<String, Value>) -> Self {
        Self {
            id: None,
            body,
            created_at: None,
            updated_at: None,
        }
    }

    /// Builder-style field assignment for tests and seeding.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.body.get(key).and_then(Value::as_i64)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.body.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.get_str(keys::SCHEMA_NAME)
    }

    /// Stored update counter; 0 for unsaved documents.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.get_i64(keys::VERSION).unwrap_or(0)
    }

    /// Flatten into a single map with `_id` alongside the body fields.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(self.body.len() + 1);
        if let Some(id) = &self.id {
            map.insert(keys::ID.to_string(), Value::String(id.clone()));
        }
        for (key, value) in &self.body {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}
