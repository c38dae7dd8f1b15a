use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use tokio::sync::mpsc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use transfer_api::auth::{AuthConfig, AuthService, RedisTokenBlacklist};
use transfer_api::config::{init_tracing, load_config};
use transfer_api::db::{establish_connection_from_app_config, run_migrations};
use transfer_api::events::{process_events, EventSender};
use transfer_api::handlers::AppServices;
use transfer_api::services::{
    AccountService, CustomerService, ExchangeRateClient, TransactionQueryService, TransferService,
};
use transfer_api::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "starting transfer-api");

    let db = Arc::new(
        establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to the database")?,
    );
    if config.auto_migrate {
        run_migrations(db.as_ref())
            .await
            .context("database migration failed")?;
    }

    let redis_client = Arc::new(
        redis::Client::open(config.redis_url.as_str()).context("invalid redis url")?,
    );
    let blacklist = Arc::new(RedisTokenBlacklist::new(redis_client, "transfer-api"));

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = EventSender::new(event_tx);
    tokio::spawn(process_events(event_rx));

    let auth = Arc::new(AuthService::new(
        AuthConfig::new(
            config.jwt_secret.clone(),
            config.auth_issuer.clone(),
            config.auth_audience.clone(),
            Duration::from_secs(config.jwt_expiration),
        ),
        db.clone(),
        blacklist,
    ));

    let converter = Arc::new(ExchangeRateClient::new(
        config.exchange_rate_api_url.clone(),
        Duration::from_secs(config.exchange_rate_timeout_secs),
    )?);

    let services = AppServices::new(
        AccountService::new(db.clone(), event_sender.clone()),
        TransferService::new(db.clone(), converter, event_sender.clone()),
        TransactionQueryService::new(db.clone()),
        CustomerService::new(db.clone(), auth.clone(), event_sender.clone()),
    );

    let config = Arc::new(config);
    let state = AppState {
        db,
        config: config.clone(),
        event_sender,
        services,
        auth,
    };

    let app = app_router(state)
        .layer(build_cors_layer(&config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

fn build_cors_layer(config: &transfer_api::config::AppConfig) -> CorsLayer {
    if let Some(origins) = config.cors_allowed_origins.as_deref() {
        let parsed: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| o.parse().ok())
            .collect();
        if !parsed.is_empty() {
            return CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any);
        }
        warn!("no valid CORS origins parsed from configuration");
    }

    if config.should_allow_permissive_cors() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install ctrl-c handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
