//! Audit trail writer and queries.
//!
//! Audit records are documents of the audit entity, stored in their own
//! location. Writes are fire-and-forget: [`AuditWriter::record`] spawns the
//! insert and returns at once, and a failed insert is logged and dropped. The
//! originating save never observes it.

use std::mem;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use eagle_core::audit::AuditRecord;
use eagle_schema::AuditSink;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::helpers::{DOCUMENT_COLS, row_to_document};

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub object_schema_name: Option<String>,
    pub object_id: Option<String>,
    pub limit: Option<u32>,
}

/// Background audit sink backed by the documents table.
pub struct AuditWriter {
    conn: libsql::Connection,
    location: String,
    entity_name: String,
    pending: Mutex<JoinSet<()>>,
}

impl AuditWriter {
    /// `entity_name` records go into `location`.
    #[must_use]
    pub fn new(conn: libsql::Connection, entity_name: &str, location: &str) -> Self {
        Self {
            conn,
            location: location.to_string(),
            entity_name: entity_name.to_string(),
            pending: Mutex::new(JoinSet::new()),
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Insert one record and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the record cannot be serialized or inserted.
    pub async fn write(&self, record: &AuditRecord) -> Result<(), DatabaseError> {
        insert_record(&self.conn, &self.location, &self.entity_name, record).await
    }

    /// Wait for every audit write spawned so far.
    pub async fn flush(&self) {
        let mut pending = mem::take(&mut *self.lock_pending());
        while let Some(result) = pending.join_next().await {
            if let Err(error) = result {
                warn!(%error, "audit task did not complete");
            }
        }
    }

    /// Query audit records, newest first.
    ///
    /// Stored timestamps vary in width (fractional seconds are omitted when
    /// zero), so ordering goes through `julianday` rather than the text.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored record is malformed.
    pub async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![
            libsql::Value::Text(self.location.clone()),
            libsql::Value::Text(self.entity_name.clone()),
        ];
        let mut conditions = vec!["location = ?1".to_string(), "schema_name = ?2".to_string()];

        if let Some(ref schema_name) = filter.object_schema_name {
            params.push(libsql::Value::Text(schema_name.clone()));
            conditions.push(format!(
                "json_extract(body, '$.objectSchemaName') = ?{}",
                params.len()
            ));
        }
        if let Some(ref object_id) = filter.object_id {
            params.push(libsql::Value::Text(object_id.clone()));
            conditions.push(format!("json_extract(body, '$.objectId') = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {DOCUMENT_COLS} FROM documents
             WHERE {}
             ORDER BY julianday(json_extract(body, '$.timestamp')) DESC, rowid DESC LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(AuditRecord::from_document(&row_to_document(&row)?)?);
        }
        Ok(records)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for AuditWriter {
    fn record(&self, record: AuditRecord) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                object_id = %record.object_id,
                "no async runtime; audit record dropped"
            );
            return;
        };

        let conn = self.conn.clone();
        let location = self.location.clone();
        let entity_name = self.entity_name.clone();

        let mut pending = self.lock_pending();
        while pending.try_join_next().is_some() {}
        pending.spawn_on(
            async move {
                match insert_record(&conn, &location, &entity_name, &record).await {
                    Ok(()) => debug!(
                        object = %record.object_schema_name,
                        object_id = %record.object_id,
                        "audit record written"
                    ),
                    Err(error) => warn!(
                        %error,
                        object = %record.object_schema_name,
                        object_id = %record.object_id,
                        "audit write failed"
                    ),
                }
            },
            &handle,
        );
    }
}

async fn insert_record(
    conn: &libsql::Connection,
    location: &str,
    entity_name: &str,
    record: &AuditRecord,
) -> Result<(), DatabaseError> {
    let body = serde_json::to_string(&record.to_body(entity_name)?)?;
    conn.execute(
        "INSERT INTO documents (id, location, schema_name, version, body, created_at, updated_at)
         VALUES (lower(hex(randomblob(12))), ?1, ?2, 0, ?3, ?4, ?4)",
        libsql::params![location, entity_name, body, Utc::now().to_rfc3339()],
    )
    .await?;
    Ok(())
}
