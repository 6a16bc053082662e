//! Integration tests: build the router over in-memory stores and drive it
//! with `oneshot` requests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use medchat_api::{AppState, config::ApiConfig};
use medchat_core::auth::jwt::generate_access_token;
use medchat_core::models::{ConversationId, User, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

fn app() -> Router {
    medchat_api::router(AppState::in_memory(ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: String::new(),
        access_token_secret: ACCESS_SECRET.into(),
        refresh_token_secret: REFRESH_SECRET.into(),
    }))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

async fn signup(app: &Router, email: &str) -> StatusCode {
    send(
        app,
        "POST",
        "/api/signup",
        None,
        Some(json!({
            "name": "Jean",
            "familyName": "Dupont",
            "email": email,
            "password": "Abcd1234!"
        })),
    )
    .await
    .0
}

/// Returns (accessToken, refreshToken).
async fn login(app: &Router, email: &str) -> (String, String) {
    let (status, json) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": email, "password": "Abcd1234!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    (
        json["accessToken"].as_str().unwrap().to_string(),
        json["refreshToken"].as_str().unwrap().to_string(),
    )
}

async fn user_with_token(app: &Router, email: &str) -> String {
    assert_eq!(signup(app, email).await, StatusCode::CREATED);
    login(app, email).await.0
}

#[tokio::test]
async fn jean_dupont_end_to_end() {
    let app = app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({
            "name": "Jean",
            "familyName": "Dupont",
            "email": "jean@x.com",
            "password": "Abcd1234!"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["email"], "jean@x.com");
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("passwordHash").is_none());

    let (status, json) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "jean@x.com", "password": "Abcd1234!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let access = json["accessToken"].as_str().unwrap().to_string();
    assert!(!access.is_empty());
    assert!(!json["refreshToken"].as_str().unwrap().is_empty());

    let (status, conv) = send(&app, "POST", "/api/conversations", Some(&access), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = conv["id"].as_str().unwrap().to_string();
    assert_eq!(conv["messages"], json!([]));

    let (status, conv) = send(
        &app,
        "POST",
        &format!("/api/conversations/{id}/message"),
        Some(&access),
        Some(json!({ "text": "bonjour" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conv["messages"], json!([{ "sender": "user", "text": "bonjour" }]));
}

#[tokio::test]
async fn duplicate_signup_is_conflict_case_insensitively() {
    let app = app();
    assert_eq!(signup(&app, "jean@x.com").await, StatusCode::CREATED);
    assert_eq!(signup(&app, "Jean@X.Com").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_signup_is_bad_request_with_message() {
    let app = app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({
            "name": "Jean",
            "familyName": "Dupont",
            "email": "jean@x.com",
            "password": "abcdefgh"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("Password"));

    let (status, json) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({ "name": "Jean" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_credentials_do_not_reveal_which_part_failed() {
    let app = app();
    assert_eq!(signup(&app, "jean@x.com").await, StatusCode::CREATED);

    let (s1, wrong_pw) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "jean@x.com", "password": "Wrong999!" })),
    )
    .await;
    let (s2, no_user) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "Abcd1234!" })),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, no_user);

    let (status, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "jean@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_valid_access_token() {
    let app = app();

    let (status, json) = send(&app, "GET", "/api/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/conversations", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/conversations")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );

    // A refresh token is not an access token.
    assert_eq!(signup(&app, "jean@x.com").await, StatusCode::CREATED);
    let (_, refresh) = login(&app, "jean@x.com").await;
    let (status, _) = send(&app, "GET", "/api/conversations", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let app = app();
    let user = User {
        id: UserId::new_v7(),
        name: "Jean".into(),
        family_name: "Dupont".into(),
        email: "jean@x.com".into(),
        created_at: Utc::now(),
    };
    let stale = generate_access_token(
        &user,
        ACCESS_SECRET.as_bytes(),
        Utc::now() - Duration::minutes(16),
    )
    .unwrap();
    let (status, _) = send(&app, "GET", "/api/conversations", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let fresh = generate_access_token(&user, ACCESS_SECRET.as_bytes(), Utc::now()).unwrap();
    let (status, json) = send(&app, "GET", "/api/conversations", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn other_users_cannot_touch_a_conversation() {
    let app = app();
    let alice = user_with_token(&app, "alice@x.com").await;
    let bob = user_with_token(&app, "bob@x.com").await;

    let (_, conv) = send(&app, "POST", "/api/conversations", Some(&alice), None).await;
    let id = conv["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/conversations/{id}/message"),
        Some(&bob),
        Some(json!({ "text": "intrusion" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/conversations/{id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, bobs) = send(&app, "GET", "/api/conversations", Some(&bob), None).await;
    assert_eq!(bobs, json!([]));

    let (status, conv) = send(
        &app,
        "GET",
        &format!("/api/conversations/{id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conv["messages"], json!([]));
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let app = app();
    let token = user_with_token(&app, "jean@x.com").await;

    let missing = ConversationId::new_v7();
    for uri in [
        format!("/api/conversations/{missing}/message"),
        "/api/conversations/not-a-uuid/message".to_string(),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&token),
            Some(json!({ "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn transcript_order_is_append_order() {
    let app = app();
    let token = user_with_token(&app, "jean@x.com").await;

    let (_, conv) = send(&app, "POST", "/api/conversations", Some(&token), None).await;
    let id = conv["id"].as_str().unwrap().to_string();
    for text in ["Hello", "bonjour douleur"] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/conversations/{id}/message"),
            Some(&token),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, list) = send(&app, "GET", "/api/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(
        list[0]["messages"],
        json!([
            { "sender": "user", "text": "Hello" },
            { "sender": "user", "text": "bonjour douleur" }
        ])
    );
}

#[tokio::test]
async fn conversations_are_listed_newest_first_and_bot_sender_is_kept() {
    let app = app();
    let token = user_with_token(&app, "jean@x.com").await;

    let (_, first) = send(&app, "POST", "/api/conversations", Some(&token), None).await;
    let (_, second) = send(&app, "POST", "/api/conversations", Some(&token), None).await;

    let (status, conv) = send(
        &app,
        "POST",
        &format!("/api/conversations/{}/message", first["id"].as_str().unwrap()),
        Some(&token),
        Some(json!({ "sender": "bot", "text": "Bonjour !" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conv["messages"][0]["sender"], "bot");

    let (_, list) = send(&app, "GET", "/api/conversations", Some(&token), None).await;
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[1]["id"], first["id"]);
}

#[tokio::test]
async fn logout_is_idempotent_and_kills_refresh() {
    let app = app();
    assert_eq!(signup(&app, "jean@x.com").await, StatusCode::CREATED);
    let (_, refresh) = login(&app, "jean@x.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let renewed = json["accessToken"].as_str().unwrap().to_string();
    let (status, _) = send(&app, "GET", "/api/conversations", Some(&renewed), None).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, json) = send(
            &app,
            "POST",
            "/api/logout",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/api/logout", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn faq_round_trip_with_fallback() {
    let app = app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/faq",
        None,
        Some(json!({
            "question": "Qu'est-ce que la fièvre ?",
            "answer": "Une température corporelle élevée."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["faq"]["question"], "Qu'est-ce que la fièvre ?");

    let (status, json) = send(
        &app,
        "POST",
        "/api/ask",
        None,
        Some(json!({ "question": "  QU'EST-CE QUE LA FIEVRE ?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Une température corporelle élevée.");

    let (status, json) = send(
        &app,
        "POST",
        "/api/ask",
        None,
        Some(json!({ "question": "J'ai mal au dos" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Désolé, je n'ai pas de réponse à cela.");
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, json) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
