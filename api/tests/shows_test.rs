mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use db::models::attendance::{Model as AttendanceModel, Status};
use db::models::show::{Column as ShowCol, Entity as ShowEntity, Model as ShowModel};

use helpers::app::{
    actor_token, admin_token, get_request, json_request, make_test_app, response_json, seed_org,
    send,
};

#[tokio::test]
async fn create_show_stores_zero_padded_time() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "create").await;
    let token = admin_token(&ctx);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/shows",
            &token,
            json!({ "date": "2030-06-01", "show_time": "9:30" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = response_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["show_time"], "09:30");
    assert_eq!(body["data"]["date"], "2030-06-01");
    assert!(body["data"]["active_at"].is_null());
    assert!(body["data"]["sign_in_token"].is_null());
}

#[tokio::test]
async fn create_show_rejects_duplicates_and_bad_shapes() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "create-dup").await;
    let token = admin_token(&ctx);

    let payload = json!({ "date": "2030-06-01", "show_time": "19:00" });
    let resp = send(&app, json_request("POST", "/api/shows", &token, payload.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, json_request("POST", "/api/shows", &token, payload)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/shows",
            &token,
            json!({ "date": "June 1st", "show_time": "19:00" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/shows",
            &token,
            json!({ "date": "2030-06-02", "show_time": "curtain" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_sweeps_expired_shows_without_attendance() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "gc").await;
    let token = admin_token(&ctx);

    let stale = ShowModel::create(state.db(), ctx.org.id, "2020-01-01".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let attended =
        ShowModel::create(state.db(), ctx.org.id, "2020-01-02".parse().unwrap(), "19:00")
            .await
            .unwrap();
    ShowModel::create(state.db(), ctx.org.id, "2030-01-01".parse().unwrap(), "19:00")
        .await
        .unwrap();

    AttendanceModel::set_status(
        state.db(),
        ctx.actor.id,
        attended.id,
        Status::SignedIn,
        Some(ctx.admin.id),
        Utc::now(),
    )
    .await
    .unwrap();

    let resp = send(&app, get_request("/api/shows", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;

    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert!(!ids.contains(&stale.id));
    assert!(ids.contains(&attended.id));
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn activation_enforces_chronological_order_and_rotates_tokens() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "activate").await;
    let token = admin_token(&ctx);

    let near = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let far = ShowModel::create(state.db(), ctx.org.id, "2030-01-12".parse().unwrap(), "19:00")
        .await
        .unwrap();

    // Skipping ahead is refused.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", far.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The next upcoming show opens and receives a token.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", near.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    let first_token = body["data"]["sign_in_token"].as_str().unwrap().to_string();
    assert!(body["data"]["active_at"].is_string());

    // Closing rotates the token again and clears active_at.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/close-signin", near.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    let closed_token = body["data"]["sign_in_token"].as_str().unwrap().to_string();
    assert_ne!(first_token, closed_token);
    assert!(body["data"]["active_at"].is_null());
    assert!(body["data"]["locked_at"].is_string());

    // A closed show can never re-open.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", near.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // With the first closed, the later show is next and opens fine.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", far.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Exactly one show is active for the organization.
    let active = ShowEntity::find()
        .filter(ShowCol::OrganizationId.eq(ctx.org.id))
        .filter(ShowCol::ActiveAt.is_not_null())
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn active_show_endpoint_reports_current_state() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "active").await;
    let token = admin_token(&ctx);

    let resp = send(&app, get_request("/api/shows/active", &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "No active show");

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", show.id),
            &token,
            json!({}),
        ),
    )
    .await;

    let resp = send(&app, get_request("/api/shows/active", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["id"], show.id);
}

#[tokio::test]
async fn shows_are_tenant_scoped() {
    let (app, state) = make_test_app().await;
    let ours = seed_org(state.db(), "tenant-a").await;
    let theirs = seed_org(state.db(), "tenant-b").await;

    let foreign =
        ShowModel::create(state.db(), theirs.org.id, "2030-01-10".parse().unwrap(), "19:00")
            .await
            .unwrap();

    // A cross-tenant id answers exactly like a missing one.
    let token = admin_token(&ours);
    let resp = send(&app, get_request(&format!("/api/shows/{}", foreign.id), &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "Show not found");

    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/shows/{}/activate", foreign.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_and_delete_round_trip() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "edit").await;
    let token = admin_token(&ctx);

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();

    let resp = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/shows/{}", show.id),
            &token,
            json!({ "show_time": "8:15" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["show_time"], "08:15");

    let resp = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/shows/{}", show.id),
            &token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(
        ShowModel::find_in_org(state.db(), show.id, ctx.org.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn show_routes_are_admin_only() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "roles").await;
    let token = actor_token(&ctx);

    let resp = send(&app, get_request("/api/shows", &token)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/shows",
            &token,
            json!({ "date": "2030-06-01", "show_time": "19:00" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
