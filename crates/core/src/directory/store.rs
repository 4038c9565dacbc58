use async_trait::async_trait;

use super::{NewRecord, Record};
use crate::error::CoreError;

/// Capability set shared by every directory backing medium.
///
/// Implementations normalize emails on the way in and on lookup, and keep
/// at most one record per normalized email. `bulk_replace` must be atomic
/// with respect to readers: a concurrent `find_by_email` or `list_all`
/// sees either the previous directory or the new one, never a mix.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Short label for logs and health output (e.g. `"memory"`).
    fn backend(&self) -> &'static str;

    /// Look up a record by email. Returns `None` when nothing matches.
    async fn find_by_email(&self, email: &str) -> Result<Option<Record>, CoreError>;

    /// Insert a single record with the next id.
    ///
    /// Fails with [`CoreError::DuplicateEmail`] if the normalized email is
    /// already present, and with [`CoreError::Validation`] on a blank name.
    async fn insert(&self, entry: &NewRecord) -> Result<Record, CoreError>;

    /// Replace the whole directory with `entries`.
    ///
    /// Entries sharing a normalized email are collapsed last-write-wins
    /// (see [`prepare_replacement`](super::prepare_replacement)) and ids
    /// restart at 1. Returns the stored records in id order.
    async fn bulk_replace(&self, entries: &[NewRecord]) -> Result<Vec<Record>, CoreError>;

    /// Every record, in id order.
    async fn list_all(&self) -> Result<Vec<Record>, CoreError>;

    /// Remove every record and reset the id sequence.
    async fn clear(&self) -> Result<(), CoreError>;

    /// Check that the backing medium is reachable.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
