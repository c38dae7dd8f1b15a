use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A registered customer. The email doubles as the login identity and is the
/// opaque "requesting identity" every authorization check compares against.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 hash, never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account::Entity")]
    Account,
    #[sea_orm(has_many = "super::favorite_recipient::Entity")]
    FavoriteRecipient,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::favorite_recipient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteRecipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
