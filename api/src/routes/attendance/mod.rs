use axum::{
    Router,
    routing::{delete, get, post},
};
use util::state::AppState;

mod common;
mod delete;
mod get;
mod post;

pub use delete::clear_attendance;
pub use get::list_attendance;
pub use post::{bulk_mark, set_attendance};

/// `/attendance` route group. Admin-only; the guard layer is applied by the
/// parent router. Self-service writes go through `/sign-in`, never here.
pub fn attendance_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(list_attendance))
        .route("/", post(set_attendance))
        .route("/", delete(clear_attendance))
        .route("/bulk", post(bulk_mark))
        .with_state(app_state)
}
