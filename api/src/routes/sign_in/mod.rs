use axum::{Router, routing::get};
use util::state::AppState;

mod get;

pub use get::sign_in_with_token;

/// `/sign-in` route group: the single endpoint an actor's QR scan lands on.
/// Actor-only; the guard layer is applied by the parent router.
pub fn sign_in_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/{token}", get(sign_in_with_token))
        .with_state(app_state)
}
