use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Saved transfer recipient, keyed by (customer, recipient account).
/// The recipient's display name is snapshotted at save time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_recipients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub customer_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub recipient_account_id: i64,

    pub recipient_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::RecipientAccountId",
        to = "super::account::Column::Id"
    )]
    RecipientAccount,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipientAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
