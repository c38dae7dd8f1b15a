use axum::{
    extract::State,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::dto::{AccountResponse, TransactionResponse};
use crate::errors::ServiceError;
use crate::handlers::common::created;
use crate::services::transfers::TransferInput;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_account_number: String,
    pub to_account_number: String,
    pub amount: Decimal,
    pub recipient_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub transaction: TransactionResponse,
    pub sender_account: AccountResponse,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(transfer))
}

async fn transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .transfers
        .transfer(
            &user.email,
            TransferInput {
                from_account_number: payload.from_account_number,
                to_account_number: payload.to_account_number,
                amount: payload.amount,
                recipient_name: payload.recipient_name,
            },
        )
        .await?;

    Ok(created(TransferResponse {
        transaction: TransactionResponse::from(outcome.transaction),
        sender_account: AccountResponse::from(outcome.sender_account),
    }))
}
