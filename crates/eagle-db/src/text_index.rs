//! Full-text index over a storage location.
//!
//! One FTS5 table per location, `text_<location>`, covering the descriptive
//! fields of every document stored there regardless of entity. Triggers on
//! `documents` keep it current; rows are keyed by the document id, since
//! implicit rowids of `documents` are not stable across `VACUUM`.

use tracing::{debug, info};

use crate::EagleDb;
use crate::error::DatabaseError;
use crate::helpers::{row_to_document, validate_identifier};
use eagle_core::document::Document;

/// Fields covered by the text index, in column order.
pub const TEXT_FIELDS: [&str; 4] = ["name", "headline", "documentFileName", "displayName"];

fn table_name(location: &str) -> Result<String, DatabaseError> {
    validate_identifier(location)?;
    Ok(format!("text_{location}"))
}

fn extracts(prefix: &str) -> String {
    TEXT_FIELDS
        .iter()
        .map(|field| format!("json_extract({prefix}body, '$.{field}')"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drops, creates and rebuilds the text index of a location.
pub struct TextIndexBuilder<'a> {
    db: &'a EagleDb,
}

impl<'a> TextIndexBuilder<'a> {
    #[must_use]
    pub const fn new(db: &'a EagleDb) -> Self {
        Self { db }
    }

    /// Whether `location` currently has a text index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` for an invalid location or a failed query.
    pub async fn exists(&self, location: &str) -> Result<bool, DatabaseError> {
        let table = table_name(location)?;
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table.as_str()],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Drop the index and its triggers.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::IndexNotFound` if there is no index to drop.
    pub async fn drop_index(&self, location: &str) -> Result<(), DatabaseError> {
        let table = table_name(location)?;
        if !self.exists(location).await? {
            return Err(DatabaseError::IndexNotFound(location.to_string()));
        }
        self.db
            .conn()
            .execute_batch(&format!(
                "DROP TRIGGER IF EXISTS {table}_ai;
                 DROP TRIGGER IF EXISTS {table}_ad;
                 DROP TRIGGER IF EXISTS {table}_au;
                 DROP TABLE IF EXISTS {table};"
            ))
            .await?;
        debug!(location, "text index dropped");
        Ok(())
    }

    /// Create the index, install its triggers and backfill existing documents.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails.
    pub async fn create_index(&self, location: &str) -> Result<(), DatabaseError> {
        let table = table_name(location)?;
        let columns = TEXT_FIELDS.join(", ");
        let new_values = extracts("new.");

        self.db
            .conn()
            .execute_batch(&format!(
                "CREATE VIRTUAL TABLE IF NOT EXISTS {table} USING fts5(
                     doc_id UNINDEXED,
                     {columns},
                     tokenize='porter unicode61'
                 );

                 CREATE TRIGGER IF NOT EXISTS {table}_ai AFTER INSERT ON documents
                 WHEN new.location = '{location}' BEGIN
                     INSERT INTO {table}(doc_id, {columns})
                     VALUES (new.id, {new_values});
                 END;

                 CREATE TRIGGER IF NOT EXISTS {table}_ad AFTER DELETE ON documents
                 WHEN old.location = '{location}' BEGIN
                     DELETE FROM {table} WHERE doc_id = old.id;
                 END;

                 CREATE TRIGGER IF NOT EXISTS {table}_au AFTER UPDATE ON documents
                 WHEN new.location = '{location}' BEGIN
                     DELETE FROM {table} WHERE doc_id = old.id;
                     INSERT INTO {table}(doc_id, {columns})
                     VALUES (new.id, {new_values});
                 END;"
            ))
            .await?;

        let backfilled = self
            .db
            .conn()
            .execute(
                &format!(
                    "INSERT INTO {table}(doc_id, {columns})
                     SELECT id, {} FROM documents WHERE location = ?1",
                    extracts("")
                ),
                [location],
            )
            .await?;
        debug!(location, backfilled, "text index created");
        Ok(())
    }

    /// Drop (tolerating a missing index) and recreate.
    ///
    /// # Errors
    ///
    /// Returns any `DatabaseError` other than `IndexNotFound` from the drop,
    /// and any error from the create.
    pub async fn rebuild(&self, location: &str) -> Result<(), DatabaseError> {
        match self.drop_index(location).await {
            Ok(()) => {}
            Err(DatabaseError::IndexNotFound(_)) => {
                info!(location, "no existing text index to drop");
            }
            Err(e) => return Err(e),
        }
        self.create_index(location).await?;
        info!(location, "text index rebuilt");
        Ok(())
    }
}

impl EagleDb {
    #[must_use]
    pub const fn text_index(&self) -> TextIndexBuilder<'_> {
        TextIndexBuilder::new(self)
    }

    /// FTS5 search over a location's text index, best match first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::IndexNotFound` if the location has no index.
    pub async fn search_text(
        &self,
        location: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Document>, DatabaseError> {
        let table = table_name(location)?;
        if !self.text_index().exists(location).await? {
            return Err(DatabaseError::IndexNotFound(location.to_string()));
        }
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT d.id, d.body, d.created_at, d.updated_at
                     FROM {table}
                     JOIN documents d ON d.id = {table}.doc_id
                     WHERE {table} MATCH ?1
                     ORDER BY {table}.rank LIMIT ?2"
                ),
                libsql::params![query, limit],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }
}
