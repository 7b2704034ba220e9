//! HTTP route entry point for `/api/...`.
//!
//! Route groups are organized by domain, each protected by the access
//! control middleware its surface requires:
//! - `/health` → liveness probe (public)
//! - `/shows` → scheduling, lifecycle transitions, import (admin-only)
//! - `/attendance` → ledger reads and writes (admin-only)
//! - `/sign-in` → QR token self-service sign-in (actors only)
//! - `/users` → organization roster, read-only (admin-only)
//! - `/organization` → tenant configuration, read-only (any authenticated user)

use crate::auth::guards::{allow_actor, allow_admin, allow_authenticated};
use crate::routes::{
    attendance::attendance_routes, health::health_routes, organization::organization_routes,
    shows::shows_routes, sign_in::sign_in_routes, users::users_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod common;
pub mod health;
pub mod organization;
pub mod shows;
pub mod sign_in;
pub mod users;

/// Builds the complete application router for all HTTP endpoints.
///
/// The sign-in group is the only surface actors can write through; nothing
/// else ever creates an attendance row on their behalf.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/shows",
            shows_routes(app_state.clone()).route_layer(from_fn(allow_admin)),
        )
        .nest(
            "/attendance",
            attendance_routes(app_state.clone()).route_layer(from_fn(allow_admin)),
        )
        .nest(
            "/sign-in",
            sign_in_routes(app_state.clone()).route_layer(from_fn(allow_actor)),
        )
        .nest(
            "/users",
            users_routes(app_state.clone()).route_layer(from_fn(allow_admin)),
        )
        .nest(
            "/organization",
            organization_routes(app_state).route_layer(from_fn(allow_authenticated)),
        )
}
