//! Self-service sign-in by scanned QR token.
//!
//! This endpoint is the only path that auto-enrolls an actor into a show.
//! Login and plain navigation never sign anyone in.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse};

use db::models::attendance::Model as AttendanceModel;
use db::models::show::Model as ShowModel;

#[derive(Debug, Serialize, Default)]
pub struct SignInShowBrief {
    pub date: String,
    pub show_time: String,
}

#[derive(Debug, Serialize, Default)]
pub struct SignInResponse {
    pub already_signed_in: bool,
    pub show: SignInShowBrief,
}

/// GET `/api/sign-in/{token}`
///
/// Tokens are globally unique, so the lookup precedes the tenant check.
/// Failure order: unknown token (404), show not active (400), sign-in
/// locked (400), foreign organization (403). Success is idempotent: an
/// existing row for the pair, whatever its status, is reported as
/// `already_signed_in` and left untouched, so an admin's earlier mark
/// (vacation, absent) survives a later scan.
pub async fn sign_in_with_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<SignInResponse>>) {
    let db = state.db();

    let show = match ShowModel::find_by_token(db, &token).await {
        Ok(Some(show)) => show,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Invalid or expired sign-in link")),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error during sign-in")),
            );
        }
    };

    if show.active_at.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("This show is not currently active")),
        );
    }
    if show.locked_at.is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Sign-in sheet is locked for this show")),
        );
    }
    if claims.org_id != show.organization_id {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("You are not in this organization")),
        );
    }

    let brief = SignInShowBrief {
        date: show.date.format("%Y-%m-%d").to_string(),
        show_time: show.show_time.clone(),
    };

    match AttendanceModel::find_pair(db, claims.sub, show.id).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SignInResponse {
                    already_signed_in: true,
                    show: brief,
                },
                "Already signed in",
            )),
        ),
        Ok(None) => {
            match AttendanceModel::create_self_signed(db, claims.sub, show.id, Utc::now()).await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(ApiResponse::success(
                        SignInResponse {
                            already_signed_in: false,
                            show: brief,
                        },
                        "Signed in",
                    )),
                ),
                Err(e) => {
                    tracing::error!(error = %e, "self-service sign-in failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiResponse::error("Failed to sign in")),
                    )
                }
            }
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Database error during sign-in")),
        ),
    }
}
