//! Email lookup against the directory.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::directory::DirectoryStore;
use crate::email::parse_email;
use crate::error::CoreError;

/// Message returned when no entry matches the searched email.
pub const NOT_FOUND_MESSAGE: &str = "No user found for this email";

/// Result of a lookup. Both variants are successful outcomes.
///
/// Serializes as `{"found": true, "name": ...}` or
/// `{"found": false, "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found { name: String },
    NotFound { message: String },
}

impl Serialize for LookupOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LookupOutcome", 2)?;
        match self {
            Self::Found { name } => {
                state.serialize_field("found", &true)?;
                state.serialize_field("name", name)?;
            }
            Self::NotFound { message } => {
                state.serialize_field("found", &false)?;
                state.serialize_field("message", message)?;
            }
        }
        state.end()
    }
}

impl LookupOutcome {
    pub fn found(name: impl Into<String>) -> Self {
        Self::Found { name: name.into() }
    }

    pub fn not_found() -> Self {
        Self::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The matched name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Found { name } => Some(name),
            Self::NotFound { .. } => None,
        }
    }
}

/// Look up the entry for `raw_email`.
///
/// Fails with [`CoreError::InvalidEmail`] only when the input is not
/// email-shaped; a well-formed email with no match is
/// [`LookupOutcome::NotFound`].
pub async fn lookup_by_email(
    store: &dyn DirectoryStore,
    raw_email: &str,
) -> Result<LookupOutcome, CoreError> {
    let email = parse_email(raw_email)?;

    let outcome = match store.find_by_email(&email).await? {
        Some(record) => LookupOutcome::found(record.name),
        None => LookupOutcome::not_found(),
    };

    tracing::debug!(found = outcome.is_found(), "Directory lookup");
    Ok(outcome)
}
