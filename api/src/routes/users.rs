//! Organization roster, read-only. Account management lives upstream; the
//! scheduling and manual-entry views only need ids, names, and roles.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::str::FromStr;
use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse, routes::common::UserResponse};

use db::models::user::{Model as UserModel, Role};

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub role: Option<String>,
}

pub fn users_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .with_state(app_state)
}

/// GET `/api/users?role=`
///
/// Lists the organization's members ordered by name, optionally narrowed to
/// one role (`actor` for the printable-sheet roster).
pub async fn list_users(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<RosterQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<UserResponse>>>) {
    let db = state.db();

    let role = match q.role.as_deref() {
        Some(raw) => match Role::from_str(raw) {
            Ok(role) => Some(role),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Role must be admin or actor")),
                );
            }
        },
        None => None,
    };

    match UserModel::roster(db, claims.org_id, role).await {
        Ok(users) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                users.into_iter().map(UserResponse::from).collect(),
                "Users retrieved",
            )),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error retrieving users")),
        ),
    }
}
