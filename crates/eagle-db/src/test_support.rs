//! Shared test utilities for eagle-db unit tests.

use std::sync::Arc;

use eagle_core::field::FieldDescriptor;
use eagle_schema::definitions::{self, AUDIT_LOCATION, SHARED_LOCATION};
use eagle_schema::{AuditSink, EntityDefinition, EntityRegistry};
use serde_json::{Map, Value};

use crate::EagleDb;
use crate::audit::AuditWriter;
use crate::store::DocumentStore;

/// In-memory store with every built-in entity registered.
pub(crate) async fn builtin_store() -> DocumentStore {
    let db = EagleDb::open_local(":memory:").await.unwrap();
    DocumentStore::with_builtins(db, "Audit", AUDIT_LOCATION, SHARED_LOCATION).unwrap()
}

/// In-memory store with the audit entity and a `Widget { title, count }` on `widgets`.
pub(crate) async fn widget_store() -> DocumentStore {
    let db = EagleDb::open_local(":memory:").await.unwrap();
    let audit = Arc::new(AuditWriter::new(db.conn().clone(), "Audit", AUDIT_LOCATION));
    let sink: Arc<dyn AuditSink> = Arc::clone(&audit) as Arc<dyn AuditSink>;
    let mut registry = EntityRegistry::new("Audit", sink);
    registry
        .register("Audit", definitions::audit(), AUDIT_LOCATION)
        .unwrap();
    registry
        .register(
            "Widget",
            EntityDefinition::new()
                .field("title", FieldDescriptor::string())
                .field("count", FieldDescriptor::number().with_default(0)),
            "widgets",
        )
        .unwrap();
    DocumentStore::new(db, Arc::new(registry), audit)
}

/// Unwrap a `json!` object literal.
pub(crate) fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
