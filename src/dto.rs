//! Response shapes returned by the HTTP layer.
//!
//! Mapping lives here as free-standing `From` conversions so the persistent
//! models stay decoupled from presentation concerns.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{account, customer, favorite_recipient, transaction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub account_number: String,
    pub account_type: account::AccountType,
    pub currency: String,
    pub balance: Decimal,
    pub account_name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            account_number: model.account_number,
            account_type: model.account_type,
            currency: model.currency,
            balance: model.balance,
            account_name: model.account_name,
            description: model.description,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accounts: Vec<AccountResponse>,
}

impl CustomerResponse {
    pub fn from_parts(customer: customer::Model, accounts: Vec<account::Model>) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            country: customer.country,
            phone_number: customer.phone_number,
            date_of_birth: customer.date_of_birth,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
            accounts: accounts.into_iter().map(AccountResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<customer::Model> for RegisterResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub sender_account_id: i64,
    pub currency: String,
    pub amount_transferred: Decimal,
    pub receiver_account_number: String,
    pub receiver_account_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            sender_account_id: model.sender_account_id,
            currency: model.currency,
            amount_transferred: model.amount_transferred,
            receiver_account_number: model.receiver_account_number,
            receiver_account_name: model.receiver_account_name,
            created_at: model.created_at,
        }
    }
}

/// One page of an account's transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPageResponse {
    pub transactions: Vec<TransactionResponse>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub is_last: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub recipient_account_id: i64,
    pub recipient_name: String,
    pub recipient_account_number: Option<String>,
}

impl FavoriteResponse {
    pub fn from_parts(
        favorite: favorite_recipient::Model,
        account: Option<account::Model>,
    ) -> Self {
        Self {
            recipient_account_id: favorite.recipient_account_id,
            recipient_name: favorite.recipient_name,
            recipient_account_number: account.map(|a| a.account_number),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account_number: String,
    pub balance: Decimal,
    pub currency: String,
}
