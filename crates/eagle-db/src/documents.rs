//! Row-level document operations shared by the store and the audit writer.

use chrono::{DateTime, Utc};
use eagle_core::document::Document;
use eagle_core::keys;
use serde_json::{Map, Value};

use crate::EagleDb;
use crate::error::DatabaseError;
use crate::helpers::{DOCUMENT_COLS, row_to_document};

/// Insert a new document row. `body` must already carry `schemaName` and `version`.
pub(crate) async fn insert(
    conn: &libsql::Connection,
    id: &str,
    location: &str,
    schema_name: &str,
    body: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let version = body.get(keys::VERSION).and_then(Value::as_i64).unwrap_or(0);
    let body = serde_json::to_string(body)?;
    conn.execute(
        "INSERT INTO documents (id, location, schema_name, version, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        libsql::params![id, location, schema_name, version, body, now.to_rfc3339()],
    )
    .await?;
    Ok(())
}

impl EagleDb {
    /// Fetch one document by id, scoped to a location and entity.
    pub(crate) async fn get_document(
        &self,
        location: &str,
        schema_name: &str,
        id: &str,
    ) -> Result<Option<Document>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLS} FROM documents
                     WHERE location = ?1 AND schema_name = ?2 AND id = ?3"
                ),
                libsql::params![location, schema_name, id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_document(&row)?)),
            None => Ok(None),
        }
    }

    /// All documents in a location, optionally narrowed to one entity, oldest first.
    pub(crate) async fn select_documents(
        &self,
        location: &str,
        schema_name: Option<&str>,
    ) -> Result<Vec<Document>, DatabaseError> {
        let mut rows = match schema_name {
            Some(schema_name) => {
                self.conn
                    .query(
                        &format!(
                            "SELECT {DOCUMENT_COLS} FROM documents
                             WHERE location = ?1 AND schema_name = ?2
                             ORDER BY created_at, rowid"
                        ),
                        libsql::params![location, schema_name],
                    )
                    .await?
            }
            None => {
                self.conn
                    .query(
                        &format!(
                            "SELECT {DOCUMENT_COLS} FROM documents
                             WHERE location = ?1 ORDER BY created_at, rowid"
                        ),
                        [location],
                    )
                    .await?
            }
        };

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }

    /// Overwrite a body, keeping the stored version. Used by full saves.
    pub(crate) async fn replace_body(
        &self,
        id: &str,
        body: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let body = serde_json::to_string(body)?;
        self.conn
            .execute(
                "UPDATE documents
                 SET body = json_set(?1, '$.version', version), updated_at = ?2
                 WHERE id = ?3",
                libsql::params![body, now.to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }

    /// Write an updated body and advance the version by `version_delta`.
    ///
    /// The increment is computed from the stored column inside the statement,
    /// so concurrent updates each advance the counter.
    pub(crate) async fn apply_update(
        &self,
        id: &str,
        body: &Map<String, Value>,
        version_delta: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let body = serde_json::to_string(body)?;
        let changed = self
            .conn
            .execute(
                "UPDATE documents
                 SET body = json_set(?1, '$.version', version + ?2),
                     version = version + ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                libsql::params![body, version_delta, now.to_rfc3339(), id],
            )
            .await?;
        Ok(changed)
    }
}
