mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{parse_decimal, TestApp};

#[tokio::test]
async fn register_creates_customer_with_default_account() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .register("Jane Doe", "jane@example.com", "correct-horse-battery", "USD")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["name"], "Jane Doe");
    assert!(body.get("password_hash").is_none());

    let token = app.login("jane@example.com", "correct-horse-battery").await;
    let (status, profile) = app.get("/api/v1/customers/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let accounts = profile["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["currency"], "USD");
    assert_eq!(accounts[0]["account_type"], "SAVINGS");
    assert_eq!(parse_decimal(&accounts[0]["balance"]), dec!(0));
    assert_eq!(
        accounts[0]["account_number"].as_str().unwrap().len(),
        12
    );
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .register("Jane", "jane@example.com", "correct-horse-battery", "USD")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .register("Other Jane", "jane@example.com", "another-password", "EUR")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let app = TestApp::spawn().await;
    let (status, _) = app
        .register("Jane", "jane@example.com", "short", "USD")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.register("Jane", "jane@example.com", "correct-horse-battery", "USD")
        .await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": "jane@example.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn unknown_email_login_matches_wrong_password() {
    let app = TestApp::spawn().await;
    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": "whatever" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/v1/customers/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .get("/api/v1/customers/me", Some("not-a-real-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::spawn().await;
    let (token, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;

    let (status, _) = app
        .request(
            axum::http::Method::POST,
            "/api/v1/auth/logout",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/customers/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A fresh login works again.
    let new_token = app.login("jane@example.com", "correct-horse-battery").await;
    let (status, _) = app.get("/api/v1/customers/me", Some(&new_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_invalidates_the_old_one() {
    let app = TestApp::spawn().await;
    let (token, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;

    let (status, _) = app
        .put(
            "/api/v1/customers/me/password",
            Some(&token),
            json!({
                "current_password": "correct-horse-battery",
                "new_password": "even-better-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": "jane@example.com", "password": "correct-horse-battery" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.login("jane@example.com", "even-better-password").await;
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let app = TestApp::spawn().await;
    let (token, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;

    let (status, _) = app
        .put(
            "/api/v1/customers/me/password",
            Some(&token),
            json!({
                "current_password": "not-my-password",
                "new_password": "even-better-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
