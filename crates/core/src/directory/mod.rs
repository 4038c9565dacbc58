//! Directory records and the storage seam.
//!
//! A directory is the full set of name/email entries currently loaded.
//! Emails are stored normalized and are unique across the directory.

pub mod memory;
pub mod store;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::email::normalize_email;
use crate::error::CoreError;
use crate::types::DbId;

pub use memory::MemoryStore;
pub use store::DirectoryStore;

/// A stored directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

/// An entry waiting to be stored. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub email: String,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Copy with the name trimmed and the email normalized.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
        }
    }

    /// Normalized copy, rejected with [`CoreError::Validation`] when the
    /// name or email is blank.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let entry = self.normalized();
        if entry.name.is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
        if entry.email.is_empty() {
            return Err(CoreError::Validation("email must not be empty".into()));
        }
        Ok(entry)
    }
}

/// Validate every entry, then collapse duplicate emails.
///
/// Input to [`DirectoryStore::bulk_replace`]; one blank entry rejects the
/// whole batch before anything is stored.
pub fn prepare_replacement(entries: &[NewRecord]) -> Result<Vec<NewRecord>, CoreError> {
    for entry in entries {
        entry.validated()?;
    }
    Ok(collapse_by_email(entries))
}

/// Collapse entries that share a normalized email, last write wins.
///
/// The surviving entry keeps the position of the first occurrence and takes
/// the name of the last one.
pub fn collapse_by_email(entries: &[NewRecord]) -> Vec<NewRecord> {
    let mut by_email: IndexMap<String, String> = IndexMap::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.normalized();
        by_email.insert(entry.email, entry.name);
    }
    by_email
        .into_iter()
        .map(|(email, name)| NewRecord { name, email })
        .collect()
}
