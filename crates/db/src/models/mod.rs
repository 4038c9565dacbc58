//! Row structs for the directory tables.

pub mod directory_entry;
