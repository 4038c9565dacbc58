//! Import pipeline: raw upload rows in, a replaced directory out.
//!
//! Rows arrive as loose key/value maps from whichever parser read the
//! upload. Each row is resolved against fixed candidate column names,
//! coerced to text, and validated. Rows that fail any step are dropped
//! without failing the import; only an import with no usable row at all is
//! rejected, and in that case the store is not touched.

use serde::Serialize;
use serde_json::Value;

use crate::directory::{DirectoryStore, NewRecord};
use crate::email::{is_valid_email, normalize_email};
use crate::error::CoreError;

/// One parsed row from an uploaded file, keyed by column header.
pub type RawRow = serde_json::Map<String, Value>;

/// Column names checked for the entry name, in priority order.
pub const NAME_KEYS: &[&str] = &["Usuario", "usuario", "USUARIO", "Name", "name", "NAME"];

/// Column names checked for the entry email, in priority order.
pub const EMAIL_KEYS: &[&str] = &["Correo", "correo", "CORREO", "Email", "email", "EMAIL"];

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows that passed validation.
    pub accepted: usize,
    /// Records in the directory after duplicate emails were collapsed.
    pub stored: usize,
}

/// Render a cell value as text. Nulls and nested values count as absent.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Return the first candidate column holding a non-blank value.
pub fn resolve_field(row: &RawRow, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| row.get(*key))
        .filter_map(value_as_text)
        .find(|text| !text.trim().is_empty())
}

/// Turn one raw row into a validated entry, or `None` if it is unusable.
pub fn normalize_row(row: &RawRow) -> Option<NewRecord> {
    let name = resolve_field(row, NAME_KEYS)?;
    let email = resolve_field(row, EMAIL_KEYS)?;

    let entry = NewRecord {
        name: name.trim().to_string(),
        email: normalize_email(&email),
    };

    if entry.name.is_empty() || !is_valid_email(&entry.email) {
        return None;
    }
    Some(entry)
}

/// Keep the usable rows, in source order.
pub fn collect_valid_rows<I>(rows: I) -> Vec<NewRecord>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut valid = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in rows.into_iter().enumerate() {
        match normalize_row(&row) {
            Some(entry) => valid.push(entry),
            None => {
                skipped += 1;
                tracing::debug!(row = index, "Skipping unusable import row");
            }
        }
    }

    if skipped > 0 {
        tracing::info!(skipped, accepted = valid.len(), "Dropped unusable import rows");
    }
    valid
}

/// Validate `rows` and, if at least one is usable, replace the directory.
///
/// Fails with [`CoreError::NoValidRows`] before touching the store when no
/// row survives validation.
pub async fn import_rows<I>(store: &dyn DirectoryStore, rows: I) -> Result<ImportSummary, CoreError>
where
    I: IntoIterator<Item = RawRow>,
{
    let valid = collect_valid_rows(rows);
    if valid.is_empty() {
        return Err(CoreError::NoValidRows);
    }

    let stored = store.bulk_replace(&valid).await?;

    let summary = ImportSummary {
        accepted: valid.len(),
        stored: stored.len(),
    };
    tracing::info!(
        backend = store.backend(),
        accepted = summary.accepted,
        stored = summary.stored,
        "Directory import completed",
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn resolve_field_follows_priority_order() {
        let r = row(json!({ "email": "second@x.com", "Correo": "first@x.com" }));
        assert_eq!(resolve_field(&r, EMAIL_KEYS).as_deref(), Some("first@x.com"));
    }

    #[test]
    fn resolve_field_skips_blank_candidates() {
        let r = row(json!({ "Usuario": "   ", "name": "Ana" }));
        assert_eq!(resolve_field(&r, NAME_KEYS).as_deref(), Some("Ana"));
    }

    #[test]
    fn resolve_field_coerces_numbers_and_ignores_null() {
        let r = row(json!({ "Usuario": null, "usuario": 1234 }));
        assert_eq!(resolve_field(&r, NAME_KEYS).as_deref(), Some("1234"));
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let r = row(json!({ "Nombre": "Ana", "Mail": "ana@x.com" }));
        assert_eq!(normalize_row(&r), None);
    }

    #[test]
    fn normalize_row_trims_and_lowercases() {
        let r = row(json!({ "Usuario": "  Ana Perez ", "Correo": " ANA@Example.com " }));
        assert_eq!(
            normalize_row(&r),
            Some(NewRecord::new("Ana Perez", "ana@example.com"))
        );
    }

    #[test]
    fn normalize_row_rejects_malformed_email() {
        let r = row(json!({ "name": "C", "email": "not-an-email" }));
        assert_eq!(normalize_row(&r), None);
    }

    #[test]
    fn normalize_row_rejects_missing_fields() {
        assert_eq!(normalize_row(&row(json!({ "name": "Only name" }))), None);
        assert_eq!(normalize_row(&row(json!({ "email": "only@x.com" }))), None);
    }

    #[test]
    fn collect_valid_rows_silently_drops_bad_rows() {
        let rows = vec![
            row(json!({ "name": "", "email": "a@b.com" })),
            row(json!({ "name": "C", "email": "not-an-email" })),
            row(json!({ "name": "D", "email": "d@e.com" })),
        ];

        assert_eq!(collect_valid_rows(rows), vec![NewRecord::new("D", "d@e.com")]);
    }
}
