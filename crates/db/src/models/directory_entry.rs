use sqlx::FromRow;
use userdir_core::directory::Record;
use userdir_core::types::DbId;

/// A row from the `directory_entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct DirectoryEntry {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

impl From<DirectoryEntry> for Record {
    fn from(row: DirectoryEntry) -> Self {
        Record {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}
