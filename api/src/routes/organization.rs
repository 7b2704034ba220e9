//! Tenant configuration, read-only. Scheduling views consume
//! `week_starts_on` and `display_title`; settings forms live upstream.

use axum::{Extension, Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use db::models::organization::Model as OrganizationModel;

#[derive(Debug, Serialize, Default)]
pub struct OrganizationResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub week_starts_on: i32,
    pub display_title: Option<String>,
}

pub fn organization_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_organization))
        .with_state(app_state)
}

/// GET `/api/organization`
pub async fn get_organization(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<OrganizationResponse>>) {
    let db = state.db();

    match OrganizationModel::find_by_id(db, claims.org_id).await {
        Ok(Some(org)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                OrganizationResponse {
                    id: org.id,
                    name: org.name,
                    slug: org.slug,
                    week_starts_on: org.week_starts_on,
                    display_title: org.display_title,
                },
                "Organization retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Organization not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error retrieving organization")),
        ),
    }
}
