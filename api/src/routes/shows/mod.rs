use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use util::state::AppState;

mod common;
mod delete;
mod get;
mod import;
mod patch;
mod post;

pub use common::{ImportResult, ImportedShow};
pub use delete::delete_show;
pub use get::{get_active_show, get_show, list_shows};
pub use import::{bulk_generate, import_shows};
pub use patch::edit_show;
pub use post::{activate_show, close_sign_in, create_show};

/// `/shows` route group. Every route here is admin-only; the guard layer is
/// applied by the parent router.
pub fn shows_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(list_shows))
        .route("/", post(create_show))
        .route("/active", get(get_active_show))
        .route("/import", post(import_shows))
        .route("/bulk-generate", post(bulk_generate))
        .route("/{show_id}", get(get_show))
        .route("/{show_id}", patch(edit_show))
        .route("/{show_id}", delete(delete_show))
        .route("/{show_id}/activate", post(activate_show))
        .route("/{show_id}/close-signin", post(close_sign_in))
        .with_state(app_state)
}
