use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use super::common::{AttendanceResponse, BulkMarkRequest, BulkMarkResponse, SetAttendanceRequest};
use db::models::attendance::Model as AttendanceModel;
use db::models::show::Model as ShowModel;
use db::models::user::Model as UserModel;

/// POST `/api/attendance`
///
/// Upserts the status for an `(actor, show)` pair. Both entities must
/// belong to the caller's organization; a missing and a cross-tenant id
/// produce the identical not-found response. Every write records who marked
/// it and recomputes `signed_in_at`. Last writer wins.
pub async fn set_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<SetAttendanceRequest>,
) -> (StatusCode, Json<ApiResponse<Option<AttendanceResponse>>>) {
    let db = state.db();

    let user = UserModel::find_in_org(db, req.user_id, claims.org_id).await;
    let show = ShowModel::find_in_org(db, req.show_id, claims.org_id).await;

    match (user, show) {
        (Ok(Some(_)), Ok(Some(_))) => {}
        (Ok(_), Ok(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("User or show not found")),
            );
        }
        _ => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error setting attendance")),
            );
        }
    }

    match AttendanceModel::set_status(
        db,
        req.user_id,
        req.show_id,
        req.status,
        Some(claims.sub),
        Utc::now(),
    )
    .await
    {
        Ok(row) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(AttendanceResponse::from(row)),
                "Attendance recorded",
            )),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to record attendance")),
        ),
    }
}

/// POST `/api/attendance/bulk`
///
/// Manual reconciliation after a connectivity gap: marks the listed actors
/// as signed in on one show. Invalid ids are dropped silently; the response
/// counts the rows actually written.
pub async fn bulk_mark(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<BulkMarkRequest>,
) -> (StatusCode, Json<ApiResponse<BulkMarkResponse>>) {
    let db = state.db();

    match ShowModel::find_in_org(db, req.show_id, claims.org_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Show not found")),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error marking attendance")),
            );
        }
    }

    match AttendanceModel::bulk_mark(
        db,
        claims.org_id,
        req.show_id,
        &req.user_ids,
        claims.sub,
        Utc::now(),
    )
    .await
    {
        Ok(count) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                BulkMarkResponse { count },
                "Attendance recorded",
            )),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to record attendance")),
        ),
    }
}
