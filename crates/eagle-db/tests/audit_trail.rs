//! Audit trail integration tests.
//!
//! - One audit record per create/save of a non-audit entity
//! - Saves of the audit entity never audit themselves
//! - Custom post-save hooks replace the audit record
//! - Partial updates produce no audit record
//! - A failed audit write never fails the save

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eagle_core::field::FieldDescriptor;
use eagle_db::EagleDb;
use eagle_db::audit::{AuditFilter, AuditWriter};
use eagle_db::filter::Filter;
use eagle_db::store::DocumentStore;
use eagle_db::update::UpdateOptions;
use eagle_schema::definitions::{self, AUDIT_LOCATION, SHARED_LOCATION};
use eagle_schema::{AuditSink, EntityDefinition, EntityRegistry};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

async fn builtin_store() -> DocumentStore {
    let db = EagleDb::open_local(":memory:").await.unwrap();
    DocumentStore::with_builtins(db, "Audit", AUDIT_LOCATION, SHARED_LOCATION).unwrap()
}

async fn store_with(extra: Vec<(&str, EntityDefinition, &str)>) -> DocumentStore {
    let db = EagleDb::open_local(":memory:").await.unwrap();
    let audit = Arc::new(AuditWriter::new(db.conn().clone(), "Audit", AUDIT_LOCATION));
    let sink: Arc<dyn AuditSink> = Arc::clone(&audit) as Arc<dyn AuditSink>;
    let mut registry = EntityRegistry::new("Audit", sink);
    registry
        .register("Audit", definitions::audit(), AUDIT_LOCATION)
        .unwrap();
    for (name, definition, location) in extra {
        registry.register(name, definition, location).unwrap();
    }
    DocumentStore::new(db, Arc::new(registry), audit)
}

// ---------------------------------------------------------------------------
// Audit records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_writes_one_audit_record() {
    let store = builtin_store().await;
    let project = store
        .model("Project")
        .unwrap()
        .create(body(json!({"name": "Site C", "_updatedBy": "dana"})))
        .await
        .unwrap();
    store.flush_audits().await;

    let id = project.id().unwrap();
    let records = store.audit_for(id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].object_id, id);
    assert_eq!(records[0].object_schema_name, "Project");
    assert_eq!(records[0].updated_by.as_deref(), Some("dana"));
    assert_eq!(records[0].added_by.as_deref(), Some("system"));
}

#[tokio::test]
async fn every_save_is_audited() {
    let store = builtin_store().await;
    let projects = store.model("Project").unwrap();
    let mut project = projects.create(body(json!({"name": "Site C"}))).await.unwrap();
    project.set("status", "Active");
    let project = projects.save(project).await.unwrap();
    store.flush_audits().await;

    assert_eq!(store.audit_for(project.id().unwrap()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn widget_audit_carries_creator() {
    let store = store_with(vec![(
        "Widget",
        EntityDefinition::new().field("title", FieldDescriptor::string()),
        "widgets",
    )])
    .await;
    let widget = store
        .model("Widget")
        .unwrap()
        .create(body(json!({"title": "gear", "_createdBy": "alice"})))
        .await
        .unwrap();
    store.flush_audits().await;

    let records = store
        .query_audit(&AuditFilter {
            object_schema_name: Some("Widget".into()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].object_id, widget.id().unwrap());
    assert_eq!(records[0].added_by.as_deref(), Some("alice"));
    assert_eq!(records[0].updated_by.as_deref(), Some("system"));
}

#[tokio::test]
async fn saving_an_audit_record_is_not_audited() {
    let store = builtin_store().await;
    let audit = store
        .model("Audit")
        .unwrap()
        .create(body(json!({
            "objectSchemaName": "Project",
            "objectId": "p1",
            "timestamp": "2026-03-01T12:00:00Z"
        })))
        .await
        .unwrap();
    store.flush_audits().await;

    assert!(audit.get("_createdBy").is_none());
    assert!(store.audit_for(audit.id().unwrap()).await.unwrap().is_empty());
    let all = store.query_audit(&AuditFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].object_id, "p1");
}

#[tokio::test]
async fn partial_updates_are_not_audited() {
    let store = builtin_store().await;
    let projects = store.model("Project").unwrap();
    let project = projects.create(body(json!({"name": "Site C"}))).await.unwrap();
    let id = project.id().unwrap();
    projects
        .update_one(&Filter::by_id(id), json!({"status": "Closed"}), UpdateOptions::default())
        .await
        .unwrap();
    store.flush_audits().await;

    assert_eq!(store.audit_for(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_audit_write_does_not_fail_the_save() {
    let store = builtin_store().await;
    store
        .db()
        .conn()
        .execute_batch(
            "CREATE TRIGGER reject_audit BEFORE INSERT ON documents
             WHEN new.location = 'audit'
             BEGIN SELECT RAISE(ABORT, 'audit unavailable'); END;",
        )
        .await
        .unwrap();

    let projects = store.model("Project").unwrap();
    let project = projects.create(body(json!({"name": "Site C"}))).await.unwrap();
    store.flush_audits().await;

    let id = project.id().unwrap();
    assert_eq!(projects.count(&Filter::all()).await.unwrap(), 1);
    assert_eq!(projects.find_by_id(id).await.unwrap().unwrap().get_str("name"), Some("Site C"));
    assert!(store.audit_for(id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Custom post-save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_post_save_replaces_audit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let store = store_with(vec![(
        "Note",
        EntityDefinition::new()
            .field("text", FieldDescriptor::string())
            .post_save(move |_: &eagle_core::document::Document| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        "notes",
    )])
    .await;

    let note = store
        .model("Note")
        .unwrap()
        .create(body(json!({"text": "hello"})))
        .await
        .unwrap();
    store.flush_audits().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(store.audit_for(note.id().unwrap()).await.unwrap().is_empty());
}
