//! [`DirectoryStore`] implementation over PostgreSQL.

use async_trait::async_trait;
use userdir_core::directory::{prepare_replacement, DirectoryStore, NewRecord, Record};
use userdir_core::email::normalize_email;
use userdir_core::error::CoreError;

use crate::repositories::DirectoryEntryRepo;
use crate::{map_db_error, DbPool};

/// Directory store backed by the `directory_entries` table.
#[derive(Debug, Clone)]
pub struct PgDirectoryStore {
    pool: DbPool,
}

impl PgDirectoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Record>, CoreError> {
        let key = normalize_email(email);
        let row = DirectoryEntryRepo::find_by_email(&self.pool, &key)
            .await
            .map_err(|e| map_db_error(e, None))?;
        Ok(row.map(Record::from))
    }

    async fn insert(&self, entry: &NewRecord) -> Result<Record, CoreError> {
        let entry = entry.validated()?;
        let row = DirectoryEntryRepo::create(&self.pool, &entry)
            .await
            .map_err(|e| map_db_error(e, Some(&entry.email)))?;
        tracing::debug!(id = row.id, "Directory entry inserted");
        Ok(row.into())
    }

    async fn bulk_replace(&self, entries: &[NewRecord]) -> Result<Vec<Record>, CoreError> {
        let entries = prepare_replacement(entries)?;
        let rows = DirectoryEntryRepo::replace_all(&self.pool, &entries)
            .await
            .map_err(|e| map_db_error(e, None))?;
        tracing::debug!(count = rows.len(), "Directory replaced");
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Record>, CoreError> {
        let rows = DirectoryEntryRepo::list_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, None))?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        DirectoryEntryRepo::clear(&self.pool)
            .await
            .map_err(|e| map_db_error(e, None))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| map_db_error(e, None))
    }
}
