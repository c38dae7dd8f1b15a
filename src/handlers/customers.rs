use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, success};
use crate::services::customers::UpdateProfileInput;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub recipient_account_number: String,
    pub name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers/me", get(get_profile).put(update_profile))
        .route("/customers/me/password", put(change_password))
        .route(
            "/customers/me/favorites",
            get(list_favorites).post(add_favorite),
        )
        .route(
            "/customers/me/favorites/:account_number",
            axum::routing::delete(remove_favorite),
        )
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.services.customers.get_profile(&user.email).await?;
    Ok(success(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .customers
        .update_profile(
            &user.email,
            UpdateProfileInput {
                name: payload.name,
                country: payload.country,
                phone_number: payload.phone_number,
                date_of_birth: payload.date_of_birth,
            },
        )
        .await?;
    Ok(success(profile))
}

async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    state
        .services
        .customers
        .change_password(&user.email, &payload.current_password, &payload.new_password)
        .await?;
    Ok(no_content())
}

async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let favorites = state.services.customers.list_favorites(&user.email).await?;
    Ok(success(favorites))
}

async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let favorite = state
        .services
        .customers
        .add_favorite(
            &user.email,
            &payload.recipient_account_number,
            payload.name,
        )
        .await?;
    Ok(created(favorite))
}

async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .customers
        .remove_favorite(&user.email, &account_number)
        .await?;
    Ok(no_content())
}
