use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, Set,
};
use tracing::{info, instrument, warn};

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::dto::{CustomerResponse, FavoriteResponse};
use crate::entities::{account, customer, favorite_recipient};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::accounts::{find_account_by_number, find_customer_by_email};

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Customer profile and favorite-recipient management.
pub struct CustomerService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
    event_sender: EventSender,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>, event_sender: EventSender) -> Self {
        Self {
            db,
            auth,
            event_sender,
        }
    }

    pub async fn get_profile(&self, caller_email: &str) -> Result<CustomerResponse, ServiceError> {
        let found = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let accounts = found
            .find_related(account::Entity)
            .filter(account::Column::Active.eq(true))
            .all(self.db.as_ref())
            .await?;
        Ok(CustomerResponse::from_parts(found, accounts))
    }

    /// Updates the fields present in the input; absent fields keep their
    /// current values.
    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        caller_email: &str,
        input: UpdateProfileInput,
    ) -> Result<CustomerResponse, ServiceError> {
        let found = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let id = found.id;

        let mut active_model = found.into_active_model();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(country) = input.country {
            active_model.country = Set(Some(country));
        }
        if let Some(phone_number) = input.phone_number {
            active_model.phone_number = Set(Some(phone_number));
        }
        if let Some(date_of_birth) = input.date_of_birth {
            active_model.date_of_birth = Set(Some(date_of_birth));
        }
        active_model.updated_at = Set(Utc::now());
        let updated = active_model.update(self.db.as_ref()).await?;

        info!(customer_id = id, "profile updated");
        let accounts = updated
            .find_related(account::Entity)
            .filter(account::Column::Active.eq(true))
            .all(self.db.as_ref())
            .await?;
        Ok(CustomerResponse::from_parts(updated, accounts))
    }

    /// Replaces the password after verifying the current one.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        caller_email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let found = find_customer_by_email(self.db.as_ref(), caller_email).await?;

        let matches = self
            .auth
            .verify_password(current_password, &found.password_hash)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        if !matches {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = self.auth.hash_password(new_password)?;
        let id = found.id;
        let mut active_model = found.into_active_model();
        active_model.password_hash = Set(new_hash);
        active_model.updated_at = Set(Utc::now());
        active_model.update(self.db.as_ref()).await?;

        info!(customer_id = id, "password changed");
        Ok(())
    }

    pub async fn list_favorites(
        &self,
        caller_email: &str,
    ) -> Result<Vec<FavoriteResponse>, ServiceError> {
        let owner = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let rows = favorite_recipient::Entity::find()
            .filter(favorite_recipient::Column::CustomerId.eq(owner.id))
            .find_also_related(account::Entity)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(favorite, recipient)| FavoriteResponse::from_parts(favorite, recipient))
            .collect())
    }

    /// Saves (or renames) a favorite recipient, resolved by account number.
    /// The display name defaults to the recipient account's own name.
    #[instrument(skip(self))]
    pub async fn add_favorite(
        &self,
        caller_email: &str,
        recipient_account_number: &str,
        name: Option<String>,
    ) -> Result<FavoriteResponse, ServiceError> {
        let owner = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let recipient = find_account_by_number(self.db.as_ref(), recipient_account_number).await?;
        let recipient_name = name.unwrap_or_else(|| recipient.account_name.clone());

        let existing = favorite_recipient::Entity::find_by_id((owner.id, recipient.id))
            .one(self.db.as_ref())
            .await?;

        let saved = match existing {
            Some(current) => {
                let mut active_model = current.into_active_model();
                active_model.recipient_name = Set(recipient_name);
                active_model.update(self.db.as_ref()).await?
            }
            None => {
                let inserted = favorite_recipient::ActiveModel {
                    customer_id: Set(owner.id),
                    recipient_account_id: Set(recipient.id),
                    recipient_name: Set(recipient_name),
                }
                .insert(self.db.as_ref())
                .await?;

                if let Err(e) = self
                    .event_sender
                    .send(Event::FavoriteAdded {
                        customer_id: owner.id,
                        recipient_account_id: recipient.id,
                    })
                    .await
                {
                    warn!("event delivery failed: {}", e);
                }
                inserted
            }
        };

        Ok(FavoriteResponse::from_parts(saved, Some(recipient)))
    }

    #[instrument(skip(self))]
    pub async fn remove_favorite(
        &self,
        caller_email: &str,
        recipient_account_number: &str,
    ) -> Result<(), ServiceError> {
        let owner = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let recipient = find_account_by_number(self.db.as_ref(), recipient_account_number).await?;

        let result = favorite_recipient::Entity::delete_by_id((owner.id, recipient.id))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Favorite recipient not found".to_string(),
            ));
        }

        if let Err(e) = self
            .event_sender
            .send(Event::FavoriteRemoved {
                customer_id: owner.id,
                recipient_account_id: recipient.id,
            })
            .await
        {
            warn!("event delivery failed: {}", e);
        }
        Ok(())
    }
}
