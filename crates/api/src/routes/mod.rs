pub mod directory;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /directory/search                               lookup by email (POST)
/// /directory/entries                              list (GET), create (POST)
/// /directory/upload                               import file (POST, multipart)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/directory", directory::router())
}
