//! Drives the assembled router end to end: identity extraction, guards, handlers.
//!
//! The pool is lazy and never connected. Every request here is decided before a
//! handler would touch the database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use toodoo::{
    app,
    config::{AppEnv, Config},
    repos::error::RepoError,
    services::{
        auth::{IdentityClaims, TokenCodec},
        ownership::{InMemoryOwners, OwnerLookup, OwnerLookupError},
    },
    state::AppState,
};

const SECRET: &str = "pipeline-test-secret";

// todo 5 belongs to user 2, todo 6 belongs to user 1
fn state() -> AppState {
    let db = PgPool::connect_lazy("postgresql:///toodoo_test").unwrap();
    let tokens = Arc::new(TokenCodec::new(SECRET).unwrap());
    let owners = InMemoryOwners::new().with_owner(5, 2).with_owner(6, 1);
    AppState::new(db, tokens, Arc::new(owners))
}

struct UnreachableOwners;

#[async_trait]
impl OwnerLookup for UnreachableOwners {
    async fn owner_of(&self, _resource_id: i32) -> Result<i32, OwnerLookupError> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut).into())
    }
}

fn state_with_broken_owner_store() -> AppState {
    let db = PgPool::connect_lazy("postgresql:///toodoo_test").unwrap();
    let tokens = Arc::new(TokenCodec::new(SECRET).unwrap());
    AppState::new(db, tokens, Arc::new(UnreachableOwners))
}

fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Test,
        database_url: "postgresql:///toodoo_test".into(),
        database_max_connections: 1,
        secret_key: SECRET.into(),
        cors_allowed_origins: vec![],
    }
}

fn token_for(subject_id: i32) -> String {
    TokenCodec::new(SECRET)
        .unwrap()
        .issue(&IdentityClaims::new(subject_id, format!("user{subject_id}")))
        .unwrap()
}

fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn bearer(subject_id: i32) -> String {
    format!("Bearer {}", token_for(subject_id))
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/health", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn logged_in_route_rejects_anonymous() {
    let (status, body) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/categories", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_tokens_degrade_to_anonymous() {
    let forged = TokenCodec::new("another-secret")
        .unwrap()
        .issue(&IdentityClaims::new(1, "user1"))
        .unwrap();

    for auth in [
        format!("Bearer {forged}"),
        "Bearer not.a.token".to_string(),
        "Bearer ".to_string(),
        format!("Basic {}", token_for(1)),
    ] {
        let (status, _) = send(
            app::router(state()),
            request(Method::GET, "/api/v1/todos", Some(&auth), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth header: {auth}");
    }
}

#[tokio::test]
async fn other_user_profile_is_unauthorized() {
    let (status, _) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/users/2", Some(&bearer(1)), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_numeric_user_id_is_unauthorized() {
    let (status, _) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/users/u1", Some(&bearer(1)), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn own_profile_reaches_the_handler() {
    // `{}` passes the guard and is rejected by the update builder
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/users/1", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_UPDATE");
}

#[tokio::test]
async fn unknown_user_fields_are_a_bad_request() {
    let (status, body) = send(
        app::router(state()),
        request(
            Method::PATCH,
            "/api/v1/users/1",
            Some(&bearer(1)),
            Some(r#"{"isAdmin":true}"#),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn non_owner_cannot_read_a_todo() {
    let (status, _) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/todos/5", Some(&bearer(1)), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_owner_patch_never_reaches_the_handler() {
    // the handler would answer 400 for an empty body
    let (status, _) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/todos/5", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_patch_reaches_the_handler() {
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/todos/6", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_UPDATE");
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let auth = format!("  bearer   {}  ", token_for(1));
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/todos/6", Some(&auth), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_UPDATE");
}

#[tokio::test]
async fn missing_todo_is_not_found_even_for_anonymous() {
    for auth in [Some(bearer(1)), None] {
        let (status, body) = send(
            app::router(state()),
            request(Method::DELETE, "/api/v1/todos/99", auth.as_deref(), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn non_numeric_todo_id_is_not_found() {
    let (status, _) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/todos/abc", Some(&bearer(1)), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_caller_on_existing_todo_is_unauthorized() {
    let (status, _) = send(
        app::router(state()),
        request(Method::GET, "/api/v1/todos/5", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_todo_requires_a_valid_body() {
    let (status, body) = send(
        app::router(state()),
        request(
            Method::POST,
            "/api/v1/todos",
            Some(&bearer(1)),
            Some(r#"{"name":"walk dog"}"#),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn full_stack_sets_request_id_and_security_headers() {
    let router = app::build_router(state(), &test_config());
    let res = router
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn padded_user_id_is_rejected_by_the_guard() {
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/users/%201", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn padded_todo_id_is_not_found_in_the_error_envelope() {
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/todos/%206", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn signed_user_id_reaches_the_handler() {
    let (status, body) = send(
        app::router(state()),
        request(Method::PATCH, "/api/v1/users/+1", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_UPDATE");
}

#[tokio::test]
async fn owner_store_failure_is_internal_and_skips_the_handler() {
    // the handler would answer 400 EMPTY_UPDATE
    let (status, body) = send(
        app::router(state_with_broken_owner_store()),
        request(Method::PATCH, "/api/v1/todos/6", Some(&bearer(1)), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
}
