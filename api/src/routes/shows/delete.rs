use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use db::models::show::{Model as ShowModel, ShowError};

/// DELETE `/api/shows/{show_id}`
///
/// Removes a show and, through the schema's cascade, its attendance rows.
pub async fn delete_show(
    State(state): State<AppState>,
    Path(show_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let db = state.db();

    match ShowModel::delete_in_org(db, show_id, claims.org_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success((), "Show deleted"))),
        Err(ShowError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Show not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to delete show")),
        ),
    }
}
