use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use util::state::AppState;

use crate::{
    auth::AuthUser,
    response::ApiResponse,
    routes::common::{ShowResponse, format_validation_errors},
};

use super::common::{EditShowRequest, parse_date_only, to_hhmm};
use db::models::show::{Model as ShowModel, ShowError};

/// PATCH `/api/shows/{show_id}`
///
/// Edits a show's date and/or time. Closed shows stay editable for
/// corrections; only the sign-in window is terminal, not the row.
pub async fn edit_show(
    State(state): State<AppState>,
    Path(show_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<EditShowRequest>,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    let db = state.db();

    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let date = match req.date.as_deref() {
        Some(s) => match parse_date_only(s) {
            Some(d) => Some(d),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Date must be a real calendar day")),
                );
            }
        },
        None => None,
    };
    let show_time = req.show_time.as_deref().map(to_hhmm);

    match ShowModel::edit(db, show_id, claims.org_id, date, show_time).await {
        Ok(show) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Show updated",
            )),
        ),
        Err(ShowError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Show not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to update show")),
        ),
    }
}
