mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use db::models::show::Model as ShowModel;

use helpers::app::{
    admin_token, get_request, json_request, make_test_app, response_json, seed_org, send,
};

#[tokio::test]
async fn set_status_upserts_and_recomputes_signed_in_at() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "ledger").await;
    let token = admin_token(&ctx);

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": ctx.actor.id, "show_id": show.id, "status": "signed_in" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["status"], "signed_in");
    assert!(body["data"]["signed_in_at"].is_string());
    assert_eq!(body["data"]["marked_by_user_id"], ctx.admin.id);

    // Overwriting to a non-signed-in status clears the timestamp.
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": ctx.actor.id, "show_id": show.id, "status": "vacation" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["status"], "vacation");
    assert!(body["data"]["signed_in_at"].is_null());

    let resp = send(
        &app,
        get_request(&format!("/api/attendance?show_id={}", show.id), &token),
    )
    .await;
    let body = response_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cross_tenant_writes_read_as_not_found() {
    let (app, state) = make_test_app().await;
    let ours = seed_org(state.db(), "ours").await;
    let theirs = seed_org(state.db(), "theirs").await;
    let token = admin_token(&ours);

    let our_show =
        ShowModel::create(state.db(), ours.org.id, "2030-01-10".parse().unwrap(), "19:00")
            .await
            .unwrap();

    // Foreign actor, our show.
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": theirs.actor.id, "show_id": our_show.id, "status": "signed_in" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "User or show not found");

    // Unknown ids answer identically.
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": 424242, "show_id": our_show.id, "status": "signed_in" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = response_json(resp).await;
    assert_eq!(body["message"], "User or show not found");
}

#[tokio::test]
async fn clear_deletes_once_then_reports_not_found() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "clear").await;
    let token = admin_token(&ctx);

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();

    send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": ctx.actor.id, "show_id": show.id, "status": "absent" }),
        ),
    )
    .await;

    let uri = format!(
        "/api/attendance?user_id={}&show_id={}",
        ctx.actor.id, show.id
    );
    let resp = send(&app, json_request("DELETE", &uri, &token, json!({}))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, json_request("DELETE", &uri, &token, json!({}))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Missing either key is a shape error, not a lookup miss.
    let resp = send(
        &app,
        json_request("DELETE", "/api/attendance?user_id=1", &token, json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_mark_counts_only_valid_actors() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "bulk").await;
    let theirs = seed_org(state.db(), "bulk-foreign").await;
    let token = admin_token(&ctx);

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance/bulk",
            &token,
            json!({
                "show_id": show.id,
                "user_ids": [ctx.actor.id, ctx.second_actor.id, theirs.actor.id, 424242]
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    assert_eq!(body["data"]["count"], 2);

    // Re-running is idempotent by natural key: same rows, same count.
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance/bulk",
            &token,
            json!({ "show_id": show.id, "user_ids": [ctx.actor.id, ctx.second_actor.id] }),
        ),
    )
    .await;
    let body = response_json(resp).await;
    assert_eq!(body["data"]["count"], 2);

    let resp = send(
        &app,
        get_request(&format!("/api/attendance?show_id={}", show.id), &token),
    )
    .await;
    let body = response_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_mark_requires_a_show_in_org() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "bulk-404").await;
    let theirs = seed_org(state.db(), "bulk-404-other").await;

    let foreign_show =
        ShowModel::create(state.db(), theirs.org.id, "2030-01-10".parse().unwrap(), "19:00")
            .await
            .unwrap();

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/attendance/bulk",
            &admin_token(&ctx),
            json!({ "show_id": foreign_show.id, "user_ids": [ctx.actor.id] }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_includes_actor_and_show_briefs() {
    let (app, state) = make_test_app().await;
    let ctx = seed_org(state.db(), "briefs").await;
    let token = admin_token(&ctx);

    let show = ShowModel::create(state.db(), ctx.org.id, "2030-01-10".parse().unwrap(), "19:00")
        .await
        .unwrap();

    send(
        &app,
        json_request(
            "POST",
            "/api/attendance",
            &token,
            json!({ "user_id": ctx.actor.id, "show_id": show.id, "status": "personal_day" }),
        ),
    )
    .await;

    let resp = send(
        &app,
        get_request(&format!("/api/attendance?user_id={}", ctx.actor.id), &token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = response_json(resp).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "personal_day");
    assert_eq!(rows[0]["user"]["first_name"], "Alice");
    assert_eq!(rows[0]["show"]["date"], "2030-01-10");
    assert_eq!(rows[0]["show"]["show_time"], "19:00");
}
