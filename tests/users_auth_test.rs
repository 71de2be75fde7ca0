// ABOUTME: Integration tests for registration, token login and user profile routes
// ABOUTME: Covers duplicates, credentials, avatars, password changes and the user directory
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_context, create_test_user, PNG_DATA_URI, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn registration(username: &str) -> Value {
    json!({
        "email": format!("{username}@example.com"),
        "username": username,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": "An0ther-good-one"
    })
}

#[tokio::test]
async fn test_register_login_and_me() {
    let ctx = create_test_context().await.unwrap();

    let response = AxumTestRequest::post("/api/users/")
        .json(&registration("ada"))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["username"], "ada");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());

    let response = AxumTestRequest::post("/api/auth/token/login/")
        .json(&json!({"email": "ada@example.com", "password": "An0ther-good-one"}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);
    let token = response.json::<Value>()["auth_token"]
        .as_str()
        .unwrap()
        .to_owned();

    let me: Value = AxumTestRequest::get("/api/users/me/")
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(me["username"], "ada");
    assert_eq!(me["is_subscribed"], false);
    assert!(me["avatar"].is_null());

    // Bearer scheme is accepted too
    let response = AxumTestRequest::get("/api/users/me/")
        .header("authorization", &format!("Bearer {token}"))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);

    let response = AxumTestRequest::post("/api/auth/token/logout/")
        .token(&token)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let ctx = create_test_context().await.unwrap();
    let response = AxumTestRequest::post("/api/users/")
        .json(&registration("ada"))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 201);

    let response = AxumTestRequest::post("/api/users/")
        .json(&registration("ada"))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 409);

    let mut reserved = registration("me");
    reserved["email"] = json!("someone@example.com");
    let response = AxumTestRequest::post("/api/users/")
        .json(&reserved)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);

    let mut bad_email = registration("grace");
    bad_email["email"] = json!("not-an-email");
    let response = AxumTestRequest::post("/api/users/")
        .json(&bad_email)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_login_with_wrong_credentials() {
    let ctx = create_test_context().await.unwrap();
    create_test_user(&ctx.resources, "cook").await.unwrap();

    for (email, password) in [
        ("cook@example.com", "wrong-password"),
        ("nobody@example.com", TEST_PASSWORD),
    ] {
        let response = AxumTestRequest::post("/api/auth/token/login/")
            .json(&json!({"email": email, "password": password}))
            .send(ctx.router())
            .await;
        assert_eq!(response.status(), 401, "{email}");
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "AUTH_INVALID");
    }
}

#[tokio::test]
async fn test_protected_routes_reject_missing_or_bad_tokens() {
    let ctx = create_test_context().await.unwrap();

    let response = AxumTestRequest::get("/api/users/me/").send(ctx.router()).await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::get("/api/users/me/")
        .token("garbage")
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_set_password() {
    let ctx = create_test_context().await.unwrap();
    let (_, token) = create_test_user(&ctx.resources, "cook").await.unwrap();

    let response = AxumTestRequest::post("/api/users/set_password/")
        .token(&token)
        .json(&json!({"current_password": "nope", "new_password": "Fresh-passw0rd"}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post("/api/users/set_password/")
        .token(&token)
        .json(&json!({"current_password": TEST_PASSWORD, "new_password": "Fresh-passw0rd"}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 204);

    let response = AxumTestRequest::post("/api/auth/token/login/")
        .json(&json!({"email": "cook@example.com", "password": "Fresh-passw0rd"}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_avatar_upload_and_delete() {
    let ctx = create_test_context().await.unwrap();
    let (_, token) = create_test_user(&ctx.resources, "cook").await.unwrap();

    let response = AxumTestRequest::put("/api/users/me/avatar/")
        .token(&token)
        .json(&json!({}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::put("/api/users/me/avatar/")
        .token(&token)
        .json(&json!({"avatar": PNG_DATA_URI}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);
    let url = response.json::<Value>()["avatar"].as_str().unwrap().to_owned();
    let file = ctx
        .media
        .path()
        .join(url.strip_prefix("http://testserver/media/").unwrap());
    assert!(file.exists());

    let me: Value = AxumTestRequest::get("/api/users/me/")
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(me["avatar"], url.as_str());

    let response = AxumTestRequest::delete("/api/users/me/avatar/")
        .token(&token)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 204);
    assert!(!file.exists());

    let me: Value = AxumTestRequest::get("/api/users/me/")
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert!(me["avatar"].is_null());
}

#[tokio::test]
async fn test_user_directory_pagination_and_profiles() {
    let ctx = create_test_context().await.unwrap();
    let (viewer, token) = create_test_user(&ctx.resources, "viewer").await.unwrap();
    let mut others = Vec::new();
    for name in ["u1", "u2", "u3"] {
        others.push(create_test_user(&ctx.resources, name).await.unwrap().0);
    }
    ctx.database()
        .subscriptions()
        .subscribe(viewer.id, others[0].id)
        .await
        .unwrap();

    let page: Value = AxumTestRequest::get("/api/users/?limit=2")
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(page["count"], 4);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["next"], "http://testserver/api/users/?page=2&limit=2");
    assert_eq!(page["results"][1]["username"], "u1");
    assert_eq!(page["results"][1]["is_subscribed"], true);

    let profile: Value = AxumTestRequest::get(&format!("/api/users/{}/", others[1].id))
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(profile["username"], "u2");
    assert_eq!(profile["is_subscribed"], false);

    let response = AxumTestRequest::get("/api/users/12345/").send(ctx.router()).await;
    assert_eq!(response.status(), 404);
}
