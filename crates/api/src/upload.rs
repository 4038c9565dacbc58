//! Parsers turning uploaded file bytes into raw directory rows.
//!
//! CSV files are read with their first line as headers. Spreadsheets
//! (`.xlsx`, `.xls`, `.xlsm`, `.ods`) are read from the first worksheet,
//! first row as headers, with empty cells omitted. The resulting rows are
//! untyped; validation happens in [`userdir_core::import`].

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use userdir_core::import::RawRow;

use crate::error::AppError;

/// File formats accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Spreadsheet,
}

impl UploadFormat {
    /// Pick a format from the uploaded file's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file format")]
    UnsupportedFormat,

    #[error("Could not parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not parse spreadsheet: {0}")]
    Spreadsheet(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Parse `bytes` according to the extension of `file_name`.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<RawRow>, UploadError> {
    match UploadFormat::from_file_name(file_name) {
        Some(UploadFormat::Csv) => parse_csv(bytes),
        Some(UploadFormat::Spreadsheet) => parse_spreadsheet(bytes),
        None => Err(UploadError::UnsupportedFormat),
    }
}

/// Parse CSV with a header line. Short rows only carry the columns present.
///
/// Fields are decoded as UTF-8 with invalid bytes replaced, so a Latin-1
/// export keeps every row instead of failing the upload.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, UploadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|header| String::from_utf8_lossy(header).into_owned())
        .collect();
    let mut rows = Vec::new();

    for record in reader.byte_records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, field)| {
                let text = String::from_utf8_lossy(field).into_owned();
                (header.clone(), Value::String(text))
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Parse the first worksheet of a workbook. Blank rows are skipped.
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<Vec<RawRow>, UploadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| UploadError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| UploadError::Spreadsheet("workbook has no worksheets".into()))?
        .map_err(|e| UploadError::Spreadsheet(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let rows = sheet_rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(header, _)| !header.is_empty())
                .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    Ok(rows)
}

/// Convert a worksheet cell to JSON. Empty cells yield `None`.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => {
            // Whole numbers render without a trailing ".0".
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(Value::from(*f as i64))
            } else {
                serde_json::Number::from_f64(*f).map(Value::Number)
            }
        }
        other => Some(Value::String(other.to_string())),
    }
}
