//! Document store and per-entity models.
//!
//! [`DocumentStore`] owns the database handle, the finished registry and the
//! audit writer. [`Model`] is the per-entity view through which documents
//! are created, saved, updated and queried; it applies the schema's
//! interceptors around every write:
//!
//! - create/save: pre-save hook, then the write, then post-save behavior
//! - `update_one`: version guard, then the write; no post-save behavior

use std::sync::Arc;

use chrono::Utc;
use eagle_core::audit::AuditRecord;
use eagle_core::document::Document;
use eagle_core::keys;
use eagle_schema::definitions::register_builtin_entities;
use eagle_schema::{AuditSink, EntityRegistry, EntitySchema};
use serde_json::{Map, Value};
use tracing::debug;

use crate::EagleDb;
use crate::audit::{AuditFilter, AuditWriter};
use crate::documents;
use crate::error::DatabaseError;
use crate::filter::Filter;
use crate::update::{UpdateOps, UpdateOptions, UpdateResult};

/// Storage entry point shared by every entity.
pub struct DocumentStore {
    db: EagleDb,
    registry: Arc<EntityRegistry>,
    audit: Arc<AuditWriter>,
}

impl DocumentStore {
    /// Wrap a database with a finished registry. `audit` must be the sink the
    /// registry was created with.
    #[must_use]
    pub const fn new(db: EagleDb, registry: Arc<EntityRegistry>, audit: Arc<AuditWriter>) -> Self {
        Self {
            db,
            registry,
            audit,
        }
    }

    /// Wire an audit writer and a registry holding every built-in entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Schema` if a built-in registration fails.
    pub fn with_builtins(
        db: EagleDb,
        audit_entity: &str,
        audit_location: &str,
        shared_location: &str,
    ) -> Result<Self, DatabaseError> {
        let audit = Arc::new(AuditWriter::new(db.conn().clone(), audit_entity, audit_location));
        let sink: Arc<dyn AuditSink> = Arc::clone(&audit) as Arc<dyn AuditSink>;
        let mut registry = EntityRegistry::new(audit_entity, sink);
        register_builtin_entities(&mut registry, shared_location, audit_location)?;
        Ok(Self::new(db, Arc::new(registry), audit))
    }

    /// Model for a registered entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownEntity` if `name` is not registered.
    pub fn model(&self, name: &str) -> Result<Model<'_>, DatabaseError> {
        let schema = self
            .registry
            .get(name)
            .ok_or_else(|| DatabaseError::UnknownEntity(name.to_string()))?;
        Ok(Model {
            store: self,
            schema,
        })
    }

    #[must_use]
    pub const fn db(&self) -> &EagleDb {
        &self.db
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn audit(&self) -> &AuditWriter {
        &self.audit
    }

    /// Every document in a location, whatever its entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_in_location(&self, location: &str) -> Result<Vec<Document>, DatabaseError> {
        self.db.select_documents(location, None).await
    }

    /// Full-text search over a location's text index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::IndexNotFound` if the index has not been built.
    pub async fn search_text(
        &self,
        location: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Document>, DatabaseError> {
        self.db.search_text(location, query, limit).await
    }

    /// Drop and recreate a location's text index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the index cannot be created.
    pub async fn rebuild_text_index(&self, location: &str) -> Result<(), DatabaseError> {
        self.db.text_index().rebuild(location).await
    }

    /// Audit records of one object, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn audit_for(&self, object_id: &str) -> Result<Vec<AuditRecord>, DatabaseError> {
        self.audit
            .query(&AuditFilter {
                object_id: Some(object_id.to_string()),
                ..AuditFilter::default()
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, DatabaseError> {
        self.audit.query(filter).await
    }

    /// Wait for outstanding audit writes.
    pub async fn flush_audits(&self) {
        self.audit.flush().await;
    }
}

/// One registered entity bound to the store.
pub struct Model<'a> {
    store: &'a DocumentStore,
    schema: Arc<EntitySchema>,
}

impl Model<'_> {
    #[must_use]
    pub const fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    fn location(&self) -> &str {
        self.schema.storage_location()
    }

    /// Build a new document from `body` and save it.
    ///
    /// # Errors
    ///
    /// See [`Self::save`].
    pub async fn create(&self, body: Map<String, Value>) -> Result<Document, DatabaseError> {
        self.save(Document::new(body)).await
    }

    /// Insert a new document or overwrite an existing one.
    ///
    /// Undeclared fields are dropped, defaults filled, and `schemaName`
    /// pinned. New documents start at version 0; a full save keeps the stored
    /// version. The post-save behavior runs once the write has committed.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Rejected` if the pre-save hook refuses the document
    /// - `DatabaseError::Schema` if the body fails validation
    /// - `DatabaseError::NotFound` when saving a document that no longer exists
    pub async fn save(&self, mut doc: Document) -> Result<Document, DatabaseError> {
        self.schema.prepare_body(&mut doc.body);
        if let Some(hook) = self.schema.pre_save() {
            hook.before_save(&mut doc)
                .map_err(|reason| DatabaseError::Rejected {
                    entity: self.schema.name().to_string(),
                    reason,
                })?;
        }
        self.schema.normalize_update(&mut doc.body);
        let now = Utc::now();

        match doc.id.clone() {
            None => {
                doc.set(keys::VERSION, 0);
                self.schema.validate(&doc.body)?;
                let id = self.store.db.generate_id().await?;
                documents::insert(
                    self.store.db.conn(),
                    &id,
                    self.location(),
                    self.schema.name(),
                    &doc.body,
                    now,
                )
                .await?;
                debug!(entity = self.schema.name(), id = %id, "document created");
                doc.id = Some(id);
                doc.created_at = Some(now);
            }
            Some(id) => {
                let stored = self
                    .store
                    .db
                    .get_document(self.location(), self.schema.name(), &id)
                    .await?
                    .ok_or_else(|| DatabaseError::NotFound {
                        entity: self.schema.name().to_string(),
                        id: id.clone(),
                    })?;
                doc.set(keys::VERSION, stored.version());
                self.schema.validate(&doc.body)?;
                self.store.db.replace_body(&id, &doc.body, now).await?;
                debug!(entity = self.schema.name(), id = %id, "document saved");
                doc.created_at = stored.created_at;
            }
        }
        doc.updated_at = Some(now);

        self.schema.post_save().run(&doc);
        Ok(doc)
    }

    /// Apply a partial update to the first document matching `filter`.
    ///
    /// The version guard runs on `payload` first, so the stored version
    /// advances by exactly one per matched update whatever the client sent.
    /// With `upsert`, a miss creates a document from the filter's equality
    /// fields, `$set` and `$setOnInsert`, at version 1. Partial updates do
    /// not run post-save behavior.
    ///
    /// `modified` counts the version bump as a change: every matched update
    /// writes a new version, so it is 1 on a match even when no field value
    /// differs.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::InvalidUpdate` for malformed payloads
    /// - `DatabaseError::Schema` if the resulting body fails validation
    pub async fn update_one(
        &self,
        filter: &Filter,
        payload: Value,
        options: UpdateOptions,
    ) -> Result<UpdateResult, DatabaseError> {
        let Value::Object(mut payload) = payload else {
            return Err(DatabaseError::InvalidUpdate(format!(
                "update must be an object, got {payload}"
            )));
        };
        self.schema.before_update(&mut payload);
        let mut ops = UpdateOps::parse(payload)?;
        let version_delta = ops.take_version_increment();
        let now = Utc::now();

        if let Some(doc) = self.find_one(filter).await? {
            let id = doc.id.clone().ok_or(DatabaseError::NoResult)?;
            let mut body = doc.body;
            ops.apply(&mut body, false);
            self.schema.normalize_update(&mut body);
            self.schema.validate(&body)?;
            let modified = self.store.db.apply_update(&id, &body, version_delta, now).await?;
            debug!(entity = self.schema.name(), id = %id, "document updated");
            return Ok(UpdateResult {
                matched: 1,
                modified,
                upserted_id: None,
            });
        }

        if !options.upsert {
            return Ok(UpdateResult::default());
        }

        let mut body: Map<String, Value> = filter
            .field_conditions()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ops.apply(&mut body, true);
        self.schema.prepare_body(&mut body);
        body.insert(keys::VERSION.to_string(), Value::from(version_delta));
        self.schema.validate(&body)?;

        let id = match filter.id() {
            Some(id) => id.to_string(),
            None => self.store.db.generate_id().await?,
        };
        documents::insert(
            self.store.db.conn(),
            &id,
            self.location(),
            self.schema.name(),
            &body,
            now,
        )
        .await?;
        debug!(entity = self.schema.name(), id = %id, "document upserted");
        Ok(UpdateResult {
            matched: 0,
            modified: 0,
            upserted_id: Some(id),
        })
    }

    /// Documents of this entity matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find(&self, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        if let Some(id) = filter.id() {
            return Ok(self
                .find_by_id(id)
                .await?
                .into_iter()
                .filter(|doc| filter.matches(doc))
                .collect());
        }
        let docs = self
            .store
            .db
            .select_documents(self.location(), Some(self.schema.name()))
            .await?;
        Ok(docs.into_iter().filter(|doc| filter.matches(doc)).collect())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, DatabaseError> {
        self.store
            .db
            .get_document(self.location(), self.schema.name(), id)
            .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count(&self, filter: &Filter) -> Result<usize, DatabaseError> {
        Ok(self.find(filter).await?.len())
    }

    /// Invoke a custom instance method of this entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Schema` if no such method is declared.
    pub fn call(&self, method: &str, doc: &Document) -> Result<Value, DatabaseError> {
        Ok(self.schema.call(method, doc)?)
    }

    /// Write through a virtual field's setter. The document is not saved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Schema` if the virtual has no setter.
    pub fn set_virtual(&self, doc: &mut Document, name: &str, value: Value) -> Result<(), DatabaseError> {
        Ok(self.schema.set_virtual(doc, name, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body, builtin_store, widget_store};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_id_defaults_and_version() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let doc = widgets
            .create(body(json!({"title": "gear", "stray": true})))
            .await
            .unwrap();

        assert_eq!(doc.id().map(str::len), Some(24));
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.get_str("_createdBy"), Some("system"));
        assert_eq!(doc.get("count"), Some(&json!(0)));
        assert_eq!(doc.schema_name(), Some("Widget"));
        assert!(doc.get("stray").is_none());

        let stored = widgets.find_by_id(doc.id().unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.body, doc.body);
    }

    #[tokio::test]
    async fn save_existing_keeps_version() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let mut doc = widgets.create(body(json!({"title": "gear"}))).await.unwrap();
        let id = doc.id().unwrap().to_string();

        widgets
            .update_one(&Filter::by_id(&id), json!({"$set": {"count": 2}}), UpdateOptions::default())
            .await
            .unwrap();

        doc.set("title", "cog");
        doc.set("version", 40);
        let saved = widgets.save(doc).await.unwrap();
        assert_eq!(saved.version(), 1);

        let stored = widgets.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.get_str("title"), Some("cog"));
        assert_eq!(stored.version(), 1);
    }

    #[tokio::test]
    async fn save_of_missing_document_is_not_found() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let mut doc = Document::new(body(json!({"title": "ghost"})));
        doc.id = Some("000000000000000000000000".into());
        let err = widgets.save(doc).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_body_is_rejected_before_write() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let err = widgets.create(body(json!({"title": 7}))).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Schema(_)));
        assert_eq!(widgets.count(&Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_entity() {
        let store = widget_store().await;
        let err = store.model("Gadget").err().unwrap();
        assert!(matches!(err, DatabaseError::UnknownEntity(ref n) if n == "Gadget"));
    }

    #[tokio::test]
    async fn pre_save_rejection_persists_nothing() {
        let store = builtin_store().await;
        let periods = store.model("CommentPeriod").unwrap();
        let err = periods
            .create(body(json!({
                "dateStarted": "2024-02-01T00:00:00Z",
                "dateCompleted": "2024-01-01T00:00:00Z"
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Rejected { ref entity, .. } if entity == "CommentPeriod"));
        assert_eq!(periods.count(&Filter::all()).await.unwrap(), 0);

        store.flush_audits().await;
        assert!(store.query_audit(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_filters_within_entity() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        widgets.create(body(json!({"title": "a", "count": 1}))).await.unwrap();
        widgets.create(body(json!({"title": "b", "count": 1}))).await.unwrap();
        widgets.create(body(json!({"title": "c", "count": 2}))).await.unwrap();

        assert_eq!(widgets.count(&Filter::all()).await.unwrap(), 3);
        assert_eq!(widgets.count(&Filter::all().where_eq("count", 1)).await.unwrap(), 2);
        let c = widgets
            .find_one(&Filter::all().where_eq("count", 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(c.get_str("title"), Some("c"));
        assert!(widgets.find(&Filter::all().where_eq("title", "z")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entities_sharing_a_location_stay_apart() {
        let store = builtin_store().await;
        store
            .model("Project")
            .unwrap()
            .create(body(json!({"name": "Site C"})))
            .await
            .unwrap();
        store
            .model("Organization")
            .unwrap()
            .create(body(json!({"name": "Acme"})))
            .await
            .unwrap();

        assert_eq!(store.model("Project").unwrap().count(&Filter::all()).await.unwrap(), 1);
        assert_eq!(store.find_in_location("epic").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_without_match_and_without_upsert_is_a_noop() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let result = widgets
            .update_one(&Filter::all().where_eq("title", "none"), json!({"count": 3}), UpdateOptions::default())
            .await
            .unwrap();
        assert_eq!(result, UpdateResult::default());
        assert_eq!(widgets.count(&Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn version_only_update_still_counts_as_modified() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let widget = widgets.create(body(json!({"title": "gear", "count": 2}))).await.unwrap();
        let id = widget.id().unwrap();

        for payload in [json!({"$set": {"count": 2}}), json!({"version": 40})] {
            let result = widgets
                .update_one(&Filter::by_id(id), payload, UpdateOptions::default())
                .await
                .unwrap();
            assert_eq!(result, UpdateResult { matched: 1, modified: 1, upserted_id: None });
        }

        let doc = widgets.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(doc.get("count"), Some(&json!(2)));
        assert_eq!(doc.version(), widget.version() + 2);
    }

    #[tokio::test]
    async fn upsert_creates_from_filter_and_payload() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        let result = widgets
            .update_one(
                &Filter::all().where_eq("title", "fresh"),
                json!({"$set": {"count": 5}, "$setOnInsert": {"_createdBy": "carol"}}),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(result.matched, 0);
        let id = result.upserted_id.unwrap();

        let doc = widgets.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("title"), Some("fresh"));
        assert_eq!(doc.get("count"), Some(&json!(5)));
        assert_eq!(doc.get_str("_createdBy"), Some("carol"));
        assert_eq!(doc.version(), 1);

        store.flush_audits().await;
        assert!(store.audit_for(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_update_payloads() {
        let store = widget_store().await;
        let widgets = store.model("Widget").unwrap();
        for payload in [json!(3), json!({"$rename": {"a": "b"}}), json!({"$inc": {"count": "x"}})] {
            let err = widgets
                .update_one(&Filter::all(), payload, UpdateOptions::upsert())
                .await
                .unwrap_err();
            assert!(matches!(err, DatabaseError::InvalidUpdate(_)));
        }
    }

    #[tokio::test]
    async fn methods_and_virtuals_through_model() {
        let store = builtin_store().await;
        let users = store.model("User").unwrap();
        let mut user = Document::new(Map::new());
        users
            .set_virtual(&mut user, "fullName", json!("Ada King Lovelace"))
            .unwrap();
        let user = users.save(user).await.unwrap();
        assert_eq!(user.get_str("middleName"), Some("King"));
        assert_eq!(
            users.schema().to_object(&user)["fullName"],
            json!("Ada King Lovelace")
        );

        let projects = store.model("Project").unwrap();
        let project = projects
            .create(body(json!({"name": "Site C", "read": ["sysadmin", "public"]})))
            .await
            .unwrap();
        assert_eq!(projects.call("isPublished", &project).unwrap(), json!(true));
        assert!(projects.call("explode", &project).is_err());
    }
}
