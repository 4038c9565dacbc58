//! Handlers for directory search, listing, single-entry creation, and
//! file import.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use userdir_core::directory::NewRecord;
use userdir_core::email::parse_email;
use userdir_core::error::CoreError;
use userdir_core::import::import_rows;
use userdir_core::lookup::lookup_by_email;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{parse_upload, UploadFormat};

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Request body for `POST /directory/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub email: String,
}

/// Request body for `POST /directory/entries`.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    pub email: String,
}

/// Response payload for a successful import.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub accepted: usize,
    pub stored: usize,
    pub message: String,
}

/// POST /api/v1/directory/search
///
/// Look up the name registered for an email. A miss is a `200` with
/// `found: false`; only a malformed email is rejected.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected search body");
        AppError::Core(CoreError::InvalidEmail(String::new()))
    })?;
    let outcome = lookup_by_email(state.store.as_ref(), &input.email).await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/directory/entries
///
/// Full directory listing in id order.
pub async fn list_entries(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = state.store.list_all().await?;

    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/directory/entries
///
/// Add a single entry. Rejects a blank name with `400` and duplicates
/// with `409`.
pub async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let email = parse_email(&input.email)?;

    let record = state.store.insert(&NewRecord::new(input.name, email)).await?;

    tracing::info!(id = record.id, "Directory entry created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/directory/upload
///
/// Accept a CSV or spreadsheet in the `file` multipart field and replace
/// the directory with its valid rows. Unusable rows are skipped; a file with
/// no usable row leaves the directory unchanged.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, data.to_vec()));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    if UploadFormat::from_file_name(&file_name).is_none() {
        return Err(AppError::BadRequest("Unsupported file format".to_string()));
    }

    tracing::info!(file_name = %file_name, bytes = data.len(), "Directory upload received");

    let rows = tokio::task::spawn_blocking(move || parse_upload(&file_name, &data))
        .await
        .map_err(|e| AppError::InternalError(format!("Upload parsing task failed: {e}")))??;

    let summary = import_rows(state.store.as_ref(), rows).await?;

    Ok(Json(DataResponse {
        data: UploadResult {
            accepted: summary.accepted,
            stored: summary.stored,
            message: format!("{} users loaded successfully", summary.accepted),
        },
    }))
}

/// Map a multipart failure, keeping the 413 for bodies over the upload limit.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
