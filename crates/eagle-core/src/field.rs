//! Field descriptors for entity definition tables.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The storage type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// RFC 3339 timestamp stored as a string.
    Date,
    /// Reference to another document by id.
    ObjectId,
    Array,
    /// Any JSON value, including nested objects.
    Mixed,
}

impl FieldType {
    /// Return the lowercase name used in error messages and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::ObjectId => "object_id",
            Self::Array => "array",
            Self::Mixed => "mixed",
        }
    }

    /// JSON Schema fragment for values of this type. `null` is always accepted.
    #[must_use]
    pub fn json_schema(self) -> Value {
        match self {
            Self::String | Self::Date | Self::ObjectId => json!({ "type": ["string", "null"] }),
            Self::Number => json!({ "type": ["number", "null"] }),
            Self::Boolean => json!({ "type": ["boolean", "null"] }),
            Self::Array => json!({ "type": ["array", "null"] }),
            Self::Mixed => json!({}),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an entity definition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub indexed: bool,
    /// Name of the entity this field points at, for `ObjectId` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            default: None,
            indexed: false,
            reference: None,
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::new(FieldType::String)
    }

    #[must_use]
    pub const fn number() -> Self {
        Self::new(FieldType::Number)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    #[must_use]
    pub const fn date() -> Self {
        Self::new(FieldType::Date)
    }

    #[must_use]
    pub const fn array() -> Self {
        Self::new(FieldType::Array)
    }

    #[must_use]
    pub const fn mixed() -> Self {
        Self::new(FieldType::Mixed)
    }

    /// Shorthand for an id reference to another entity.
    #[must_use]
    pub fn reference(entity: &str) -> Self {
        Self {
            reference: Some(entity.to_string()),
            ..Self::new(FieldType::ObjectId)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}
