use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use knowledge_base::config::PasswordHashConfig;
use knowledge_base::db::Database;
use knowledge_base::gateway::build_router;
use knowledge_base::gateway::state::AppState;
use knowledge_base::gateway::types::error_codes;
use knowledge_base::user_auth::{
    CredentialHasher, SigningAlgorithm, TokenService, UserAuthService, UserRepository,
};

const SECRET: &str = "qa-secret";

/// Router over a fresh in-memory database, with cheap Argon2 parameters
async fn setup() -> (Router, Arc<Database>) {
    let db = Database::connect_in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    let db = Arc::new(db);

    let hasher = CredentialHasher::new(PasswordHashConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let user_auth = UserAuthService::new(
        db.pool().clone(),
        hasher,
        TokenService::new(SECRET, SigningAlgorithm::HS256, 30).unwrap(),
    );

    let app = build_router(Arc::new(AppState::new(db.clone(), Arc::new(user_auth))));
    (app, db)
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    raw: Vec<u8>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let raw = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
    Reply {
        status,
        headers,
        raw,
        body,
    }
}

async fn register(app: &Router, username: &str, password: &str) -> Reply {
    send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> Reply {
    send(
        app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn token_for(app: &Router, username: &str) -> String {
    register(app, username, "secret123").await;
    let reply = login(app, username, "secret123").await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn qa_tc_register_then_login() {
    let (app, _db) = setup().await;

    let reply = register(&app, "alice", "secret123").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "alice");
    assert!(reply.body["id"].as_i64().unwrap() > 0);
    assert!(reply.body["created_at"].is_string());
    // no password material in the response
    let fields: Vec<&String> = reply.body.as_object().unwrap().keys().collect();
    assert_eq!(fields.len(), 3);
    assert!(!String::from_utf8_lossy(&reply.raw).contains("secret123"));

    let reply = login(&app, "alice", "secret123").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["token_type"], "bearer");
    assert!(!reply.body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn qa_tc_duplicate_username_rejected() {
    let (app, db) = setup().await;
    assert_eq!(register(&app, "alice", "secret123").await.status, StatusCode::OK);

    let reply = register(&app, "alice", "another1").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], error_codes::DUPLICATE_USERNAME);
    assert_eq!(UserRepository::count(db.pool()).await.unwrap(), 1);

    // usernames are case-sensitive
    assert_eq!(register(&app, "Alice", "secret123").await.status, StatusCode::OK);
}

#[tokio::test]
async fn qa_tc_register_validation() {
    let (app, _db) = setup().await;

    let short_name = register(&app, "ab", "secret123").await;
    assert_eq!(short_name.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(short_name.body["code"], error_codes::INVALID_PARAMETER);

    let short_password = register(&app, "alice", "12345").await;
    assert_eq!(short_password.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn qa_tc_wrong_password_and_unknown_user_are_indistinguishable() {
    let (app, _db) = setup().await;
    register(&app, "alice", "secret123").await;

    let wrong_password = login(&app, "alice", "not-the-password").await;
    let unknown_user = login(&app, "mallory", "secret123").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.raw, unknown_user.raw);
    assert_eq!(wrong_password.body["code"], error_codes::AUTH_FAILED);
}

#[tokio::test]
async fn qa_tc_bearer_failures_collapse_to_401() {
    let (app, _db) = setup().await;
    let token = token_for(&app, "alice").await;

    let missing = send(&app, Method::GET, "/knowledge", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["code"], error_codes::MISSING_AUTH);
    assert_eq!(missing.headers[header::WWW_AUTHENTICATE], "Bearer");

    let garbage = send(&app, Method::GET, "/knowledge", Some("not-a-token"), None).await;

    // flip one character inside the signature segment
    let sig_at = token.rfind('.').unwrap() + 5;
    let mut tampered: Vec<char> = token.chars().collect();
    tampered[sig_at] = if tampered[sig_at] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();
    let tampered = send(&app, Method::GET, "/knowledge", Some(&tampered), None).await;

    let foreign = TokenService::new("other-secret", SigningAlgorithm::HS256, 30)
        .unwrap()
        .issue("alice")
        .unwrap();
    let foreign = send(&app, Method::GET, "/knowledge", Some(&foreign), None).await;

    let expired = TokenService::new(SECRET, SigningAlgorithm::HS256, 30)
        .unwrap()
        .issue_at("alice", Utc::now() - Duration::minutes(31))
        .unwrap();
    let expired = send(&app, Method::GET, "/knowledge", Some(&expired), None).await;

    let ghost = TokenService::new(SECRET, SigningAlgorithm::HS256, 30)
        .unwrap()
        .issue("ghost")
        .unwrap();
    let ghost = send(&app, Method::GET, "/knowledge", Some(&ghost), None).await;

    for reply in [&garbage, &tampered, &foreign, &expired, &ghost] {
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.headers[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(reply.raw, garbage.raw);
    }
    assert_eq!(garbage.body["code"], error_codes::INVALID_TOKEN);

    let ok = send(&app, Method::GET, "/knowledge", Some(&token), None).await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[tokio::test]
async fn qa_tc_entry_lifecycle() {
    let (app, _db) = setup().await;
    let token = token_for(&app, "alice").await;

    let created = send(
        &app,
        Method::POST,
        "/knowledge",
        Some(&token),
        Some(json!({ "title": "Rust", "content": "Ownership notes", "category": "lang" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(created.body["title"], "Rust");
    assert_eq!(created.body["category"], "lang");

    let fetched = send(&app, Method::GET, &format!("/knowledge/{id}"), Some(&token), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let updated = send(
        &app,
        Method::PUT,
        &format!("/knowledge/{id}"),
        Some(&token),
        Some(json!({ "title": "Rust 2024", "content": "Edition notes" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Rust 2024");
    assert_eq!(updated.body["category"], Value::Null);
    assert_eq!(updated.body["created_at"], created.body["created_at"]);

    let deleted = send(&app, Method::DELETE, &format!("/knowledge/{id}"), Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.raw.is_empty());

    let gone = send(&app, Method::GET, &format!("/knowledge/{id}"), Some(&token), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["code"], error_codes::NOT_FOUND);

    let again = send(&app, Method::DELETE, &format!("/knowledge/{id}"), Some(&token), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn qa_tc_only_author_may_modify() {
    let (app, _db) = setup().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let created = send(
        &app,
        Method::POST,
        "/knowledge",
        Some(&alice),
        Some(json!({ "title": "Mine", "content": "hands off" })),
    )
    .await;
    let uri = format!("/knowledge/{}", created.body["id"]);

    // reading is open to any authenticated user
    let read = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(read.status, StatusCode::OK);

    let update = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "title": "Yours", "content": "taken" })),
    )
    .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(update.body["code"], error_codes::FORBIDDEN);

    let delete = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let still_there = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(still_there.body["title"], "Mine");
}

#[tokio::test]
async fn qa_tc_list_filters_and_pages() {
    let (app, _db) = setup().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    for (token, title) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2"), (&alice, "a3")] {
        let reply = send(
            &app,
            Method::POST,
            "/knowledge",
            Some(token),
            Some(json!({ "title": title, "content": "..." })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    let all = send(&app, Method::GET, "/knowledge", Some(&bob), None).await;
    assert_eq!(all.body.as_array().unwrap().len(), 4);

    let page = send(&app, Method::GET, "/knowledge?skip=1&limit=2", Some(&bob), None).await;
    let titles: Vec<&str> = page
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["b1", "a2"]);

    let alice_id = all.body[0]["author_id"].as_i64().unwrap();
    let mine = send(
        &app,
        Method::GET,
        &format!("/knowledge?author_id={alice_id}"),
        Some(&bob),
        None,
    )
    .await;
    let mine = mine.body.as_array().unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|e| e["author_id"] == alice_id));
}

#[tokio::test]
async fn qa_tc_entry_validation() {
    let (app, _db) = setup().await;
    let token = token_for(&app, "alice").await;

    let long_title = "x".repeat(201);
    let reply = send(
        &app,
        Method::POST,
        "/knowledge",
        Some(&token),
        Some(json!({ "title": long_title, "content": "..." })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["code"], error_codes::INVALID_PARAMETER);

    let empty_title = send(
        &app,
        Method::POST,
        "/knowledge",
        Some(&token),
        Some(json!({ "title": "", "content": "..." })),
    )
    .await;
    assert_eq!(empty_title.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn qa_tc_missing_field_uses_error_envelope() {
    let (app, _db) = setup().await;

    let reply = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["code"], error_codes::INVALID_PARAMETER);
    assert!(reply.body["msg"].as_str().unwrap().contains("password"));

    let login = send(
        &app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(login.body["code"], error_codes::INVALID_PARAMETER);
}

#[tokio::test]
async fn qa_tc_unparseable_input_uses_error_envelope() {
    let (app, _db) = setup().await;
    let token = token_for(&app, "alice").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/knowledge")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], error_codes::INVALID_PARAMETER);

    let bad_query = send(&app, Method::GET, "/knowledge?limit=many", Some(&token), None).await;
    assert_eq!(bad_query.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_query.body["code"], error_codes::INVALID_PARAMETER);

    let bad_id = send(&app, Method::GET, "/knowledge/abc", Some(&token), None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["code"], error_codes::INVALID_PARAMETER);
}
