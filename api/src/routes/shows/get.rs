//! Show read routes: ranged listing (with the inline GC sweep), the active
//! show, and single-show fetch.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use util::{config, state::AppState};

use crate::{auth::AuthUser, response::ApiResponse, routes::common::ShowResponse};

use super::common::{ListShowsQuery, parse_date_only};
use db::models::show::Model as ShowModel;

/// GET `/api/shows?start&end`
///
/// Lists the organization's shows ordered by `(date, show_time)`. The sweep
/// of expired, attendance-free shows runs inline here before the read; it
/// is a side effect of listing, not a background job.
pub async fn list_shows(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<ListShowsQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<ShowResponse>>>) {
    let db = state.db();

    let start = match q.start.as_deref() {
        Some(s) => match parse_date_only(s) {
            Some(d) => Some(d),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Start date must be YYYY-MM-DD")),
                );
            }
        },
        None => None,
    };
    let end = match q.end.as_deref() {
        Some(s) => match parse_date_only(s) {
            Some(d) => Some(d),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("End date must be YYYY-MM-DD")),
                );
            }
        },
        None => None,
    };

    if let Err(e) = ShowModel::delete_expired_without_attendance(
        db,
        claims.org_id,
        Utc::now(),
        config::gc_grace_hours(),
    )
    .await
    {
        tracing::warn!(error = %e, "expired-show sweep failed; continuing with listing");
    }

    match ShowModel::list_in_org(db, claims.org_id, start, end).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter().map(ShowResponse::from).collect(),
                "Shows retrieved",
            )),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error retrieving shows")),
        ),
    }
}

/// GET `/api/shows/active`
///
/// The show currently open for sign-in, or 404 when none is.
pub async fn get_active_show(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    let db = state.db();

    match ShowModel::find_active(db, claims.org_id).await {
        Ok(Some(show)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Active show retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("No active show")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error retrieving active show")),
        ),
    }
}

/// GET `/api/shows/{show_id}`
pub async fn get_show(
    State(state): State<AppState>,
    Path(show_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Option<ShowResponse>>>) {
    let db = state.db();

    match ShowModel::find_in_org(db, show_id, claims.org_id).await {
        Ok(Some(show)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(ShowResponse::from(show)),
                "Show retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Show not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error retrieving show")),
        ),
    }
}
