//! # eagle-db
//!
//! libSQL-backed document store for Eagle entities.
//!
//! Every registered entity persists into a named location; locations are
//! rows of one `documents` table keyed by `location` and `schema_name`, with
//! the full document held as JSON. On top of that:
//! - [`store::DocumentStore`] / [`store::Model`]: create, save, partial
//!   update, and queries, with the schema's interceptors applied
//! - [`audit::AuditWriter`]: fire-and-forget audit sink
//! - [`text_index`]: FTS5 index over a shared location

pub mod audit;
mod documents;
pub mod error;
pub mod filter;
pub mod helpers;
mod migrations;
pub mod store;
pub mod text_index;
pub mod update;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and connection. The connection is cheap to clone
/// and is shared with the audit writer's background tasks.
pub struct EagleDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl EagleDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        Self::from_database(db).await
    }

    /// Open a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        Self::from_database(db).await
    }

    async fn from_database(db: libsql::Database) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;
        let eagle_db = Self { db, conn };
        eagle_db.run_migrations().await?;
        Ok(eagle_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a document id: 24 lowercase hex characters.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT lower(hex(randomblob(12)))", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
