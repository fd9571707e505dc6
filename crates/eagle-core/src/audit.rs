use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::errors::CoreError;
use crate::keys;

/// An append-only audit entry recording one save of some other entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub object_schema_name: String,
    pub object_id: String,
    pub updated_by: Option<String>,
    pub added_by: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build the record for a document that has just been saved.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the document has no id or no
    /// `schemaName` (it was never persisted through a registered schema).
    pub fn for_document(doc: &Document, timestamp: DateTime<Utc>) -> Result<Self, CoreError> {
        let object_id = doc
            .id()
            .ok_or_else(|| CoreError::Validation("cannot audit an unsaved document".into()))?;
        let object_schema_name = doc
            .schema_name()
            .ok_or_else(|| CoreError::Validation(format!("document {object_id} has no schemaName")))?;

        Ok(Self {
            object_schema_name: object_schema_name.to_string(),
            object_id: object_id.to_string(),
            updated_by: doc.get_str(keys::UPDATED_BY).map(String::from),
            added_by: doc.get_str(keys::CREATED_BY).map(String::from),
            timestamp,
        })
    }

    /// Storage body for the audit entity named `schema_name`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if serialization fails.
    pub fn to_body(&self, schema_name: &str) -> Result<Map<String, Value>, CoreError> {
        let Value::Object(mut body) =
            serde_json::to_value(self).map_err(|e| CoreError::Other(e.into()))?
        else {
            return Err(CoreError::Validation("audit record is not an object".into()));
        };
        body.insert(keys::SCHEMA_NAME.to_string(), Value::from(schema_name));
        body.insert(keys::VERSION.to_string(), Value::from(0));
        Ok(body)
    }

    /// Read a record back from a stored audit document.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if required fields are missing.
    pub fn from_document(doc: &Document) -> Result<Self, CoreError> {
        serde_json::from_value(Value::Object(doc.body.clone()))
            .map_err(|e| CoreError::Validation(format!("malformed audit record: {e}")))
    }
}
