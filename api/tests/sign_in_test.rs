mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use db::models::attendance::{Entity as AttendanceEntity, Model as AttendanceModel, Status};
use db::models::show::Model as ShowModel;

use helpers::app::{
    actor_token, admin_token, get_request, json_request, make_test_app, response_json, seed_org,
    send,
};

/// Activates a future show through the API and returns its sign-in token.
async fn activate_show(
    app: &helpers::app::TestApp,
    token: &str,
    show_id: i64,
) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            &format!("/api/shows/{show_id}/activate"),
            token,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    body["data"]["sign_in_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn scanning_twice_is_idempotent() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "scan").await;

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let sign_in_token = activate_show(&app, &admin_token(&ctx), show.id).await;

    let token = actor_token(&ctx);
    let resp = send(&app, get_request(&format!("/api/sign-in/{sign_in_token}"), &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["already_signed_in"], false);
    assert_eq!(body["data"]["show"]["date"], "2030-01-10");
    assert_eq!(body["data"]["show"]["show_time"], "19:00");

    // The row is self-service: marked_by stays NULL.
    let row = AttendanceModel::find_pair(state.db(), ctx.actor.id, show.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, Status::SignedIn);
    assert!(row.signed_in_at.is_some());
    assert!(row.marked_by_user_id.is_none());

    let resp = send(&app, get_request(&format!("/api/sign-in/{sign_in_token}"), &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["already_signed_in"], true);

    let rows = AttendanceEntity::find().count(state.db()).await.unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn scan_never_overwrites_an_admin_mark() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "vacation").await;

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let sign_in_token = activate_show(&app, &admin_token(&ctx), show.id).await;

    AttendanceModel::set_status(
        state.db(),
        ctx.actor.id,
        show.id,
        Status::Vacation,
        Some(ctx.admin.id),
        Utc::now(),
    )
    .await
    .unwrap();

    let resp = send(
        &app,
        get_request(&format!("/api/sign-in/{sign_in_token}"), &actor_token(&ctx)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["already_signed_in"], true);

    let row = AttendanceModel::find_pair(state.db(), ctx.actor.id, show.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, Status::Vacation);
    assert_eq!(row.marked_by_user_id, Some(ctx.admin.id));
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "bad-token").await;

    let resp = send(
        &app,
        get_request("/api/sign-in/not-a-real-token", &actor_token(&ctx)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "Invalid or expired sign-in link");
}

#[tokio::test]
async fn token_of_a_deactivated_show_stops_working() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "deactivated").await;
    let admin = admin_token(&ctx);

    let near = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let far = ShowModel::create(state.db(), ctx.org.id, "2030-01-12".parse().unwrap(), "19:00")
        .await
        .unwrap();

    let near_token = activate_show(&app, &admin, near.id).await;
    // Activating the next show forces the first back to scheduled; its old
    // QR keeps its token but the show is no longer active.
    activate_show(&app, &admin, far.id).await;

    let resp = send(
        &app,
        get_request(&format!("/api/sign-in/{near_token}"), &actor_token(&ctx)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "This show is not currently active");
}

#[tokio::test]
async fn foreign_org_actor_is_rejected() {
    let (app, state) = make_test_app().await;
    let ours = seed_org(state.db(), "home").await;
    let theirs = seed_org(state.db(), "visiting").await;

    let show = ShowModel::create(state.db(), ours.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let sign_in_token = activate_show(&app, &admin_token(&ours), show.id).await;

    let resp = send(
        &app,
        get_request(&format!("/api/sign-in/{sign_in_token}"), &actor_token(&theirs)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "You are not in this organization");
}

#[tokio::test]
async fn sign_in_is_actor_only() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "actor-only").await;

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();
    let admin = admin_token(&ctx);
    let sign_in_token = activate_show(&app, &admin, show.id).await;

    let resp = send(&app, get_request(&format!("/api/sign-in/{sign_in_token}"), &admin)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
