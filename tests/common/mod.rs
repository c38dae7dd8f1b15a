#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use transfer_api::auth::{AuthConfig, AuthService, InMemoryTokenBlacklist};
use transfer_api::config::AppConfig;
use transfer_api::db::{establish_connection_with_config, run_migrations, DbConfig, DbPool};
use transfer_api::events::{process_events, EventSender};
use transfer_api::handlers::AppServices;
use transfer_api::services::{
    AccountService, CustomerService, FixedRateConverter, TransactionQueryService, TransferService,
};
use transfer_api::{app_router, AppState};

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Full application wired against an in-memory SQLite database, an in-process
/// token blacklist, and a fixed-rate currency converter (USD -> EUR at 0.9).
pub struct TestApp {
    pub router: Router,
    pub db: Arc<DbPool>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // A single connection keeps every query on the same in-memory
        // database.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let db = Arc::new(
            establish_connection_with_config(&db_config)
                .await
                .expect("test database"),
        );
        run_migrations(db.as_ref()).await.expect("migrations");

        let config = Arc::new(AppConfig::new(
            "sqlite::memory:",
            "redis://127.0.0.1:6379",
            TEST_JWT_SECRET,
            3600,
            "127.0.0.1",
            0,
            "test",
        ));

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(process_events(event_rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig::new(
                TEST_JWT_SECRET,
                config.auth_issuer.clone(),
                config.auth_audience.clone(),
                Duration::from_secs(config.jwt_expiration),
            ),
            db.clone(),
            Arc::new(InMemoryTokenBlacklist::new()),
        ));

        let converter = Arc::new(
            FixedRateConverter::new()
                .with_rate("USD", "EUR", dec!(0.9))
                .with_rate("EUR", "USD", dec!(1.1)),
        );

        let services = AppServices::new(
            AccountService::new(db.clone(), event_sender.clone()),
            TransferService::new(db.clone(), converter, event_sender.clone()),
            TransactionQueryService::new(db.clone()),
            CustomerService::new(db.clone(), auth.clone(), event_sender.clone()),
        );

        let state = AppState {
            db: db.clone(),
            config,
            event_sender,
            services,
            auth,
        };

        Self {
            router: app_router(state),
            db,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, payload)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// Registers a customer with a default account in `currency`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        currency: &str,
    ) -> (StatusCode, Value) {
        self.post(
            "/api/v1/auth/register",
            None,
            json!({
                "name": name,
                "email": email,
                "password": password,
                "account_type": "SAVINGS",
                "currency": currency,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Registers, logs in, and returns (token, default account number).
    pub async fn register_and_login(
        &self,
        name: &str,
        email: &str,
        currency: &str,
    ) -> (String, String) {
        let (status, body) = self.register(name, email, "correct-horse-battery", currency).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let token = self.login(email, "correct-horse-battery").await;
        let account_number = self.primary_account_number(&token).await;
        (token, account_number)
    }

    pub async fn primary_account_number(&self, token: &str) -> String {
        let (status, body) = self.get("/api/v1/customers/me", Some(token)).await;
        assert_eq!(status, StatusCode::OK, "profile fetch failed: {}", body);
        body["accounts"][0]["account_number"]
            .as_str()
            .expect("account number")
            .to_string()
    }

    pub async fn deposit(&self, token: &str, account_number: &str, amount: &str) {
        let (status, body) = self
            .put(
                &format!("/api/v1/accounts/{}/deposit", account_number),
                Some(token),
                json!({ "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "deposit failed: {}", body);
    }

    pub async fn balance_of(&self, token: &str, account_number: &str) -> rust_decimal::Decimal {
        let (status, body) = self
            .get(
                &format!("/api/v1/accounts/{}/balance", account_number),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "balance fetch failed: {}", body);
        parse_decimal(&body["balance"])
    }
}

/// Reads a Decimal out of a JSON value serialized either as string or number.
pub fn parse_decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        other => other
            .to_string()
            .parse()
            .expect("decimal number"),
    }
}
