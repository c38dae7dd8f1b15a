use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::dto::AccountResponse;
use crate::entities::account::AccountType;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, success, PaginationParams};
use crate::services::accounts::{CreateAccountInput, UpdateAccountInput};
use crate::services::transactions::HistoryQuery;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
    pub currency: String,
    pub account_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub account_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route(
            "/accounts/:account_number",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/:account_number/deposit", put(deposit))
        .route("/accounts/:account_number/withdraw", put(withdraw))
        .route("/accounts/:account_number/balance", get(get_balance))
        .route(
            "/accounts/:account_number/transactions",
            get(list_transactions),
        )
}

async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state
        .services
        .accounts
        .create_account(
            &user.email,
            CreateAccountInput {
                account_type: payload.account_type,
                currency: payload.currency,
                account_name: payload.account_name,
                description: payload.description,
            },
        )
        .await?;
    Ok(created(AccountResponse::from(account)))
}

async fn list_accounts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let accounts = state.services.accounts.list_accounts(&user.email).await?;
    Ok(success(
        accounts
            .into_iter()
            .map(AccountResponse::from)
            .collect::<Vec<_>>(),
    ))
}

async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state
        .services
        .accounts
        .get_account(&user.email, &account_number)
        .await?;
    Ok(success(AccountResponse::from(account)))
}

async fn update_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state
        .services
        .accounts
        .update_account(
            &user.email,
            &account_number,
            UpdateAccountInput {
                account_name: payload.account_name,
                description: payload.description,
            },
        )
        .await?;
    Ok(success(AccountResponse::from(account)))
}

async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .accounts
        .delete_account(&user.email, &account_number)
        .await?;
    Ok(no_content())
}

async fn deposit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
    Json(payload): Json<AmountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state
        .services
        .accounts
        .deposit(&user.email, &account_number, payload.amount)
        .await?;
    Ok(success(AccountResponse::from(account)))
}

async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
    Json(payload): Json<AmountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state
        .services
        .accounts
        .withdraw(&user.email, &account_number, payload.amount)
        .await?;
    Ok(success(AccountResponse::from(account)))
}

async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let balance = state
        .services
        .accounts
        .get_balance(&user.email, &account_number)
        .await?;
    Ok(success(balance))
}

async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_number): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .transactions
        .history(
            &user.email,
            &account_number,
            HistoryQuery {
                page_no: params.page_no,
                page_size: params.page_size,
                sort_by: params.sort_by.clone(),
                descending: params.descending(),
            },
        )
        .await?;
    Ok(success(page))
}
