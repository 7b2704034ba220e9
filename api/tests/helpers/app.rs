use axum::{Router, body::Body, http::Request, response::Response};
use ctor::ctor;
use std::convert::Infallible;
use tower::ServiceExt;
use tower::util::BoxCloneService;
use util::state::AppState;

use api::routes::routes;
use db::models::organization::Model as OrgModel;
use db::models::user::{Model as UserModel, Role};
use sea_orm::DatabaseConnection;

#[ctor]
fn setup_tests() {
    // The config singleton reads these on first access; integration tests
    // never touch a real database file or a shared secret.
    unsafe {
        std::env::set_var("DATABASE_PATH", "sqlite::memory:");
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("JWT_DURATION_MINUTES", "60");
    }
}

pub type TestApp = BoxCloneService<Request<Body>, Response, Infallible>;

/// Builds the real router over a fresh in-memory database with migrations
/// applied. Returns the app as a cloneable service plus the state for
/// direct model-level assertions.
pub async fn make_test_app() -> (TestApp, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db);

    let router = Router::new().nest("/api", routes(app_state.clone()));
    (router.into_service().boxed_clone(), app_state)
}

/// One organization with an admin and two actors, the shape most suites need.
pub struct TestOrg {
    pub org: OrgModel,
    pub admin: UserModel,
    pub actor: UserModel,
    pub second_actor: UserModel,
}

pub async fn seed_org(db: &DatabaseConnection, slug: &str) -> TestOrg {
    let org = OrgModel::create(db, "Demo Theatre Company", slug)
        .await
        .expect("create organization");

    let admin = UserModel::create(
        db,
        &format!("admin@{slug}.theatre"),
        "Admin",
        "User",
        Role::Admin,
        org.id,
    )
    .await
    .expect("create admin");

    let actor = UserModel::create(
        db,
        &format!("alice@{slug}.theatre"),
        "Alice",
        "Anderson",
        Role::Actor,
        org.id,
    )
    .await
    .expect("create actor");

    let second_actor = UserModel::create(
        db,
        &format!("bob@{slug}.theatre"),
        "Bob",
        "Brown",
        Role::Actor,
        org.id,
    )
    .await
    .expect("create actor");

    TestOrg {
        org,
        admin,
        actor,
        second_actor,
    }
}

pub fn admin_token(ctx: &TestOrg) -> String {
    api::auth::generate_jwt(ctx.admin.id, "admin", ctx.org.id).0
}

pub fn actor_token(ctx: &TestOrg) -> String {
    api::auth::generate_jwt(ctx.actor.id, "actor", ctx.org.id).0
}

/// Builds a JSON request with a bearer token.
pub fn json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn response_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &TestApp, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}
