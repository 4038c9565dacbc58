//! Domain logic for the user directory.
//!
//! Holds the record types, email normalization, the [`DirectoryStore`]
//! seam with its in-memory implementation, the import pipeline, and the
//! lookup service. Nothing here touches a database or HTTP.
//!
//! [`DirectoryStore`]: directory::DirectoryStore

pub mod directory;
pub mod email;
pub mod error;
pub mod import;
pub mod lookup;
pub mod types;
