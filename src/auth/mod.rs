//! Authentication: JWT issue/verify, argon2 password hashing, token
//! revocation, and the axum middleware/extractor the protected routes use.
//!
//! Token parsing ends here: services only ever see the already-authenticated
//! caller email.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{account, customer};
use crate::errors::{ErrorResponse, ServiceError};
use crate::middleware_helpers::request_id::current_request_id;

pub mod blacklist;

pub use blacklist::{InMemoryTokenBlacklist, RedisTokenBlacklist, TokenBlacklist};

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the customer's email (the requesting identity everywhere)
    pub sub: String,
    /// Customer's display name
    pub name: String,
    /// Unique token id, the revocation key
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated caller extracted from a validated token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    pub name: String,
    pub token_id: String,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            token_ttl,
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("No authentication token provided")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Authentication token has been revoked")]
    RevokedToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth
            | Self::MissingToken
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::RevokedToken
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match status {
            // Internal failures stay generic
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            request_id: current_request_id(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Issued-token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Registration input; the default account is created alongside the customer.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub account_type: account::AccountType,
    pub currency: String,
}

/// Authentication service: registration, login, token lifecycle.
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    db: Arc<DbPool>,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>, blacklist: Arc<dyn TokenBlacklist>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
            db,
            blacklist,
        }
    }

    /// Registers a customer together with their default account, atomically.
    pub async fn register(&self, input: RegisterInput) -> Result<customer::Model, ServiceError> {
        let password_hash = self.hash_password(&input.password)?;
        let currency = input.currency.to_uppercase();
        let now = Utc::now();

        self.db
            .transaction::<_, customer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let email = input.email;
                    let taken = customer::Entity::find()
                        .filter(customer::Column::Email.eq(email.clone()))
                        .count(txn)
                        .await?;
                    if taken > 0 {
                        return Err(ServiceError::EmailExists(email));
                    }

                    let saved = customer::ActiveModel {
                        name: Set(input.name.clone()),
                        email: Set(email.clone()),
                        password_hash: Set(password_hash),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    // A concurrent registration can slip past the count and
                    // hit the unique index instead.
                    .map_err(|e| {
                        crate::services::accounts::map_unique_violation(
                            e,
                            ServiceError::EmailExists(email),
                        )
                    })?;

                    let account_number =
                        crate::services::accounts::generate_unique_account_number(txn).await?;
                    account::ActiveModel {
                        account_number: Set(account_number),
                        customer_id: Set(saved.id),
                        account_type: Set(input.account_type),
                        currency: Set(currency),
                        balance: Set(Decimal::ZERO),
                        account_name: Set(input.name),
                        description: Set(Some("Default account".to_string())),
                        active: Set(true),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(saved)
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
                sea_orm::TransactionError::Transaction(e) => e,
            })
    }

    /// Verifies credentials and issues a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let found = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        // A missing customer and a wrong password are indistinguishable to
        // the caller.
        let found = found.ok_or(AuthError::InvalidCredentials)?;
        if !self.verify_password(password, &found.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.generate_token(&found)
    }

    /// Issues a signed token for a customer.
    pub fn generate_token(&self, who: &customer::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = self.config.token_ttl.as_secs();
        let claims = Claims {
            sub: who.email.clone(),
            name: who.name.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl as i64,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: ttl,
        })
    }

    /// Validates a token's signature, claims, and revocation status.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_audience(&[self.config.audience.clone()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        if self.blacklist.is_revoked(&data.claims.jti).await? {
            return Err(AuthError::RevokedToken);
        }
        Ok(data.claims)
    }

    /// Revokes a token for the remainder of its life (logout). Works across
    /// replicas because the blacklist is shared state, not process memory.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;

        let remaining = claims.exp - Utc::now().timestamp();
        if remaining > 0 {
            self.blacklist
                .revoke(&claims.jti, Duration::from_secs(remaining as u64))
                .await?;
        }
        debug!(jti = %claims.jti, "token revoked");
        Ok(())
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::InternalError(format!("stored hash unreadable: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Authentication middleware: validates the bearer token and stores the
/// caller in the request extensions for the `AuthUser` extractor.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("auth service not available".to_string())
                .into_response();
        }
    };

    let token = match bearer_token(&request) {
        Some(token) => token,
        None => return AuthError::MissingToken.into_response(),
    };

    match auth_service.validate_token(&token).await {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                email: claims.sub,
                name: claims.name,
                token_id: claims.jti,
            });
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extension methods for Router to gate routes behind authentication.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }
}
