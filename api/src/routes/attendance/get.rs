use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::collections::HashMap;

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use super::common::{AttendanceQuery, AttendanceResponse, AttendanceShowBrief, AttendanceUserBrief};
use db::models::attendance::Model as AttendanceModel;
use db::models::show::{Column as ShowCol, Entity as ShowEntity};
use db::models::user::{Column as UserCol, Entity as UserEntity};

/// GET `/api/attendance?show_id|user_id`
///
/// Org-scoped ledger listing. Each row carries a brief of its actor and its
/// show, resolved only for the returned rows.
pub async fn list_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<AttendanceQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<AttendanceResponse>>>) {
    let db = state.db();

    let rows = match AttendanceModel::list_in_org(db, claims.org_id, q.show_id, q.user_id).await {
        Ok(rows) => rows,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error retrieving attendance")),
            );
        }
    };

    let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
    let show_ids: Vec<i64> = rows.iter().map(|r| r.show_id).collect();

    let mut user_map = HashMap::new();
    if !user_ids.is_empty() {
        let users = UserEntity::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(db)
            .await
            .unwrap_or_default();
        for u in users {
            user_map.insert(
                u.id,
                AttendanceUserBrief {
                    id: u.id,
                    first_name: u.first_name,
                    last_name: u.last_name,
                },
            );
        }
    }

    let mut show_map = HashMap::new();
    if !show_ids.is_empty() {
        let shows = ShowEntity::find()
            .filter(ShowCol::Id.is_in(show_ids))
            .all(db)
            .await
            .unwrap_or_default();
        for s in shows {
            show_map.insert(
                s.id,
                AttendanceShowBrief {
                    id: s.id,
                    date: s.date.format("%Y-%m-%d").to_string(),
                    show_time: s.show_time,
                },
            );
        }
    }

    let records = rows
        .into_iter()
        .map(|r| {
            let mut resp = AttendanceResponse::from(r);
            resp.user = user_map.get(&resp.user_id).cloned();
            resp.show = show_map.get(&resp.show_id).cloned();
            resp
        })
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(records, "Attendance retrieved")),
    )
}
