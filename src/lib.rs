//! Money-transfer backend: accounts, deposits and withdrawals, cross-currency
//! transfers with an external rate source, transaction history, and JWT
//! authentication with server-side revocation.

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;

use crate::auth::{AuthRouterExt, AuthService};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

/// All `/api/v1` routes. Everything except registration and login sits
/// behind the bearer-token middleware.
pub fn api_v1_routes() -> Router<AppState> {
    let protected = Router::new()
        .merge(handlers::auth::protected_routes())
        .merge(handlers::accounts::routes())
        .merge(handlers::transfers::routes())
        .merge(handlers::customers::routes())
        .with_auth();

    Router::new()
        .merge(handlers::auth::public_routes())
        .merge(protected)
}

/// Assembles the full application router with middleware applied.
pub fn app_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
        .layer(Extension(auth_service))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match db::check_connection(state.db.as_ref()).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
    }))
}
