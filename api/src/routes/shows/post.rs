//! Show write routes: manual creation and the two lifecycle transitions.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use validator::Validate;

use util::state::AppState;

use crate::{
    auth::AuthUser,
    response::ApiResponse,
    routes::common::{ShowResponse, format_validation_errors},
};

use super::common::{CreateShowRequest, parse_date_only, to_hhmm};
use db::models::show::{Model as ShowModel, ShowError};

/// POST `/api/shows`
///
/// Creates a scheduled show. `(organization, date, show_time)` is unique,
/// so resubmitting the same payload reports a duplicate rather than
/// double-writing.
pub async fn create_show(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateShowRequest>,
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

    let Some(date) = parse_date_only(&req.date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Date must be a real calendar day")),
        );
    };
    let show_time = to_hhmm(&req.show_time);

    if let Ok(Some(_)) =
        ShowModel::find_by_org_date_time(db, claims.org_id, date, &show_time).await
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("A show already exists at that date and time")),
        );
    }

    match ShowModel::create(db, claims.org_id, date, &show_time).await {
        Ok(show) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Show created",
            )),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to create show")),
        ),
    }
}

/// POST `/api/shows/{show_id}/activate`
///
/// Opens the show for self-service sign-in. Only the next upcoming show in
/// the organization's schedule may open; every other org show is forced back
/// to scheduled in the same transaction, and the sign-in token rotates.
pub async fn activate_show(
    State(state): State<AppState>,
    Path(show_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    let db = state.db();

    match ShowModel::activate(db, show_id, claims.org_id, Utc::now()).await {
        Ok(show) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Show opened for sign-in",
            )),
        ),
        Err(e) => show_error_response(e, "Failed to activate show"),
    }
}

/// POST `/api/shows/{show_id}/close-signin`
///
/// Permanently shuts the active show's sign-in window and rotates the token
/// again, so the printed QR cannot keep working after closing.
pub async fn close_sign_in(
    State(state): State<AppState>,
    Path(show_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    let db = state.db();

    match ShowModel::close_sign_in(db, show_id, claims.org_id, Utc::now()).await {
        Ok(show) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Sign-in closed",
            )),
        ),
        Err(e) => show_error_response(e, "Failed to close sign-in"),
    }
}

fn show_error_response(
    e: ShowError,
    db_failure_msg: &str,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    match e {
        ShowError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Show not found")),
        ),
        ShowError::Closed | ShowError::NotNextUpcoming | ShowError::NotActive => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        ),
        ShowError::Db(err) => {
            tracing::error!(error = %err, "show lifecycle transition failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(db_failure_msg)),
            )
        }
    }
}
