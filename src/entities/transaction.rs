use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable ledger entry for one completed transfer, anchored to the sender.
///
/// The amount and currency are the sender-side (pre-conversion) values. The
/// receiver is denormalized by account number and display name so history
/// stays accurate even if the receiver account is later renamed or deleted.
/// Rows are append-only: nothing in the codebase updates or deletes them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub sender_account_id: i64,

    /// Currency of the sender's account.
    pub currency: String,

    /// Amount debited from the sender, before conversion.
    pub amount_transferred: Decimal,

    pub receiver_account_number: String,
    pub receiver_account_name: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::SenderAccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
