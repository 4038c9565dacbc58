/// Directory entry ids mirror the PostgreSQL BIGSERIAL column.
pub type DbId = i64;
