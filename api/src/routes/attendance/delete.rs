use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use super::common::AttendanceQuery;
use db::models::attendance::Model as AttendanceModel;
use db::models::show::Model as ShowModel;
use db::models::user::Model as UserModel;

/// DELETE `/api/attendance?user_id&show_id`
///
/// Removes the record for the pair, returning the ledger to "unset" for
/// that actor and show. Cross-tenant pairs and absent rows get the same
/// not-found response.
pub async fn clear_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<AttendanceQuery>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let db = state.db();

    let (Some(user_id), Some(show_id)) = (q.user_id, q.show_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("user_id and show_id required")),
        );
    };

    let user = UserModel::find_in_org(db, user_id, claims.org_id).await;
    let show = ShowModel::find_in_org(db, show_id, claims.org_id).await;
    match (user, show) {
        (Ok(Some(_)), Ok(Some(_))) => {}
        (Ok(_), Ok(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Attendance record not found")),
            );
        }
        _ => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to clear attendance")),
            );
        }
    }

    match AttendanceModel::clear(db, user_id, show_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Attendance cleared")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Attendance record not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to clear attendance")),
        ),
    }
}
