//! Route definitions for the directory.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::directory;
use crate::state::AppState;

/// Directory routes mounted at `/directory`.
///
/// ```text
/// POST   /search            -> search
/// GET    /entries           -> list_entries
/// POST   /entries           -> create_entry
/// POST   /upload            -> upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", post(directory::search))
        .route(
            "/entries",
            get(directory::list_entries).post(directory::create_entry),
        )
        .route("/upload", post(directory::upload))
}
