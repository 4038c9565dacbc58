//! In-memory directory store.
//!
//! The directory lives in a [`Snapshot`] behind a `tokio` [`RwLock`].
//! Bulk replacement builds the next snapshot without holding the lock and
//! swaps it in under a single write guard, so readers never see a
//! half-imported directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::DirectoryStore;
use super::{prepare_replacement, NewRecord, Record};
use crate::email::normalize_email;
use crate::error::CoreError;
use crate::types::DbId;

/// First id handed out by an empty store.
const FIRST_ID: DbId = 1;

#[derive(Debug)]
struct Snapshot {
    records: Vec<Record>,
    /// Normalized email -> index into `records`.
    email_index: HashMap<String, usize>,
    next_id: DbId,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            email_index: HashMap::new(),
            next_id: FIRST_ID,
        }
    }

    /// Append `entry`, which must already be normalized and absent.
    fn push(&mut self, entry: NewRecord) -> Record {
        let record = Record {
            id: self.next_id,
            name: entry.name,
            email: entry.email,
        };
        self.next_id += 1;
        self.email_index
            .insert(record.email.clone(), self.records.len());
        self.records.push(record.clone());
        record
    }
}

/// Directory store held entirely in process memory.
///
/// Each instance is independent; construct one per server or per test.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Snapshot>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Snapshot::empty()),
        }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Record>, CoreError> {
        let key = normalize_email(email);
        let snapshot = self.inner.read().await;
        Ok(snapshot
            .email_index
            .get(&key)
            .and_then(|&idx| snapshot.records.get(idx))
            .cloned())
    }

    async fn insert(&self, entry: &NewRecord) -> Result<Record, CoreError> {
        let entry = entry.validated()?;
        let mut snapshot = self.inner.write().await;
        if snapshot.email_index.contains_key(&entry.email) {
            return Err(CoreError::DuplicateEmail(entry.email));
        }
        let record = snapshot.push(entry);
        tracing::debug!(id = record.id, "Directory entry inserted");
        Ok(record)
    }

    async fn bulk_replace(&self, entries: &[NewRecord]) -> Result<Vec<Record>, CoreError> {
        let mut next = Snapshot::empty();
        for entry in prepare_replacement(entries)? {
            next.push(entry);
        }
        let stored = next.records.clone();

        *self.inner.write().await = next;

        tracing::debug!(count = stored.len(), "Directory replaced");
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Record>, CoreError> {
        Ok(self.inner.read().await.records.clone())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        *self.inner.write().await = Snapshot::empty();
        Ok(())
    }
}
