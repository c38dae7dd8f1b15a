mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn favorites_roundtrip() {
    let app = TestApp::spawn().await;
    let (jane, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;
    let (_, bob_acct) = app.register_and_login("Bob", "bob@example.com", "USD").await;

    let (status, favorites) = app.get("/api/v1/customers/me/favorites", Some(&jane)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favorites.as_array().unwrap().len(), 0);

    let (status, favorite) = app
        .post(
            "/api/v1/customers/me/favorites",
            Some(&jane),
            json!({ "recipient_account_number": bob_acct }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // Name defaults to the recipient account's own display name.
    assert_eq!(favorite["recipient_name"], "Bob");
    assert_eq!(favorite["recipient_account_number"], bob_acct);

    let (status, favorites) = app.get("/api/v1/customers/me/favorites", Some(&jane)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/customers/me/favorites/{}", bob_acct),
            Some(&jane),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, favorites) = app.get("/api/v1/customers/me/favorites", Some(&jane)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favorites.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn re_adding_a_favorite_renames_it() {
    let app = TestApp::spawn().await;
    let (jane, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;
    let (_, bob_acct) = app.register_and_login("Bob", "bob@example.com", "USD").await;

    let (status, _) = app
        .post(
            "/api/v1/customers/me/favorites",
            Some(&jane),
            json!({ "recipient_account_number": bob_acct, "name": "Bob (rent)" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, favorite) = app
        .post(
            "/api/v1/customers/me/favorites",
            Some(&jane),
            json!({ "recipient_account_number": bob_acct, "name": "Bob (utilities)" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(favorite["recipient_name"], "Bob (utilities)");

    let (_, favorites) = app.get("/api/v1/customers/me/favorites", Some(&jane)).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn favoriting_an_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;
    let (jane, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;

    let (status, _) = app
        .post(
            "/api/v1/customers/me/favorites",
            Some(&jane),
            json!({ "recipient_account_number": "999999999999" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_a_missing_favorite_is_not_found() {
    let app = TestApp::spawn().await;
    let (jane, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;
    let (_, bob_acct) = app.register_and_login("Bob", "bob@example.com", "USD").await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/customers/me/favorites/{}", bob_acct),
            Some(&jane),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_updates_persist() {
    let app = TestApp::spawn().await;
    let (jane, _) = app
        .register_and_login("Jane", "jane@example.com", "USD")
        .await;

    let (status, profile) = app
        .put(
            "/api/v1/customers/me",
            Some(&jane),
            json!({
                "country": "NL",
                "phone_number": "+31 6 12345678",
                "date_of_birth": "1990-04-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["country"], "NL");
    assert_eq!(profile["name"], "Jane");

    let (_, profile) = app.get("/api/v1/customers/me", Some(&jane)).await;
    assert_eq!(profile["country"], "NL");
    assert_eq!(profile["phone_number"], "+31 6 12345678");
    assert_eq!(profile["date_of_birth"], "1990-04-01");
}
