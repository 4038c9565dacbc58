//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool or an open transaction as the first argument.

pub mod directory_entry_repo;

pub use directory_entry_repo::DirectoryEntryRepo;
