//! Repository for the `directory_entries` table.
//!
//! Callers pass entries already normalized; the table's check constraint
//! rejects anything that is not.

use sqlx::{PgPool, Postgres, Transaction};
use userdir_core::directory::NewRecord;

use crate::models::directory_entry::DirectoryEntry;

/// Column list for `directory_entries` queries.
const COLUMNS: &str = "id, name, email";

/// Provides CRUD operations for directory entries.
pub struct DirectoryEntryRepo;

impl DirectoryEntryRepo {
    /// Find the entry with the given normalized email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<DirectoryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM directory_entries WHERE email = $1");
        sqlx::query_as::<_, DirectoryEntry>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert one entry. Fails on `uq_directory_entries_email` if the email exists.
    pub async fn create(pool: &PgPool, entry: &NewRecord) -> Result<DirectoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO directory_entries (name, email) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DirectoryEntry>(&query)
            .bind(&entry.name)
            .bind(&entry.email)
            .fetch_one(pool)
            .await
    }

    /// List all entries in id order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DirectoryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM directory_entries ORDER BY id");
        sqlx::query_as::<_, DirectoryEntry>(&query)
            .fetch_all(pool)
            .await
    }

    /// Remove every entry and restart the id sequence.
    pub async fn truncate(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
        sqlx::query("TRUNCATE directory_entries RESTART IDENTITY")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Insert `entries` in order inside an open transaction.
    ///
    /// Entries must have distinct emails. Returns the rows sorted by id.
    pub async fn batch_insert(
        tx: &mut Transaction<'_, Postgres>,
        entries: &[NewRecord],
    ) -> Result<Vec<DirectoryEntry>, sqlx::Error> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let emails: Vec<String> = entries.iter().map(|e| e.email.clone()).collect();

        let query = format!(
            "INSERT INTO directory_entries (name, email) \
             SELECT name, email \
             FROM UNNEST($1::text[], $2::text[]) WITH ORDINALITY AS t(name, email, ord) \
             ORDER BY ord \
             RETURNING {COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, DirectoryEntry>(&query)
            .bind(&names)
            .bind(&emails)
            .fetch_all(&mut **tx)
            .await?;
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    /// Replace the whole table with `entries` in one transaction.
    ///
    /// `TRUNCATE` holds an access-exclusive lock until commit, so concurrent
    /// readers wait and then see only the new rows.
    pub async fn replace_all(
        pool: &PgPool,
        entries: &[NewRecord],
    ) -> Result<Vec<DirectoryEntry>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::truncate(&mut tx).await?;
        let rows = Self::batch_insert(&mut tx, entries).await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Delete every entry and restart the id sequence.
    pub async fn clear(pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::truncate(&mut tx).await?;
        tx.commit().await
    }
}
