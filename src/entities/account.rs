use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account category offered to customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[sea_orm(string_value = "Savings")]
    Savings,
    #[sea_orm(string_value = "Current")]
    Current,
}

/// A customer-owned account. The `account_number` is the public handle used
/// by every external operation; the surrogate `id` never leaves the system.
///
/// Invariants: `balance` is never negative after a committed operation, and a
/// customer holds at most one account per currency (also enforced by a unique
/// index on `(customer_id, currency)`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Public handle, randomly generated at creation.
    #[sea_orm(unique)]
    pub account_number: String,

    pub customer_id: i64,

    pub account_type: AccountType,

    /// ISO 4217 code, e.g. "USD".
    pub currency: String,

    pub balance: Decimal,

    /// Display name shown to counterparties; transfers verify it when the
    /// caller supplies an expected recipient name.
    pub account_name: String,

    pub description: Option<String>,

    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
