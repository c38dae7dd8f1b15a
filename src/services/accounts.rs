use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::db::DbPool;
use crate::dto::BalanceResponse;
use crate::entities::{account, customer};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const ACCOUNT_NUMBER_LEN: usize = 12;
const ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateAccountInput {
    #[validate(length(min = 1, max = 128))]
    pub account_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct CreateAccountInput {
    pub account_type: account::AccountType,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter ISO code"))]
    pub currency: String,
    #[validate(length(min = 1, max = 128))]
    pub account_name: String,
    pub description: Option<String>,
}

/// Account lifecycle and single-account balance mutations. Transfers build
/// on the locked `credit`/`debit` primitives exposed here.
pub struct AccountService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl AccountService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Opens an additional account for the caller. One account per currency
    /// per customer.
    #[instrument(skip(self, input), fields(currency = %input.currency))]
    pub async fn create_account(
        &self,
        caller_email: &str,
        input: CreateAccountInput,
    ) -> Result<account::Model, ServiceError> {
        input.validate()?;
        let owner = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let currency = input.currency.to_uppercase();
        let now = Utc::now();

        let created = self
            .db
            .transaction::<_, account::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = account::Entity::find()
                        .filter(account::Column::CustomerId.eq(owner.id))
                        .filter(account::Column::Currency.eq(currency.clone()))
                        .count(txn)
                        .await?;
                    if existing > 0 {
                        return Err(ServiceError::AccountCurrencyExists(currency));
                    }

                    let account_number = generate_unique_account_number(txn).await?;
                    let created = account::ActiveModel {
                        account_number: Set(account_number),
                        customer_id: Set(owner.id),
                        account_type: Set(input.account_type),
                        currency: Set(currency.clone()),
                        balance: Set(Decimal::ZERO),
                        account_name: Set(input.account_name),
                        description: Set(input.description),
                        active: Set(true),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    // A concurrent creation can slip past the count and hit
                    // the unique index instead.
                    .map_err(|e| {
                        map_unique_violation(e, ServiceError::AccountCurrencyExists(currency))
                    })?;

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(account_id = created.id, "account created");
        self.emit(Event::AccountCreated {
            account_id: created.id,
            account_number: created.account_number.clone(),
            currency: created.currency.clone(),
        })
        .await;

        Ok(created)
    }

    /// Renames an account or replaces its description; fields absent from
    /// the input keep their current values. The new display name is what
    /// future transfers verify an expected recipient name against.
    #[instrument(skip(self, input))]
    pub async fn update_account(
        &self,
        caller_email: &str,
        account_number: &str,
        input: UpdateAccountInput,
    ) -> Result<account::Model, ServiceError> {
        input.validate()?;
        let target = find_owned_account(self.db.as_ref(), caller_email, account_number).await?;
        let id = target.id;

        let mut active_model = target.into_active_model();
        if let Some(account_name) = input.account_name {
            active_model.account_name = Set(account_name);
        }
        if let Some(description) = input.description {
            active_model.description = Set(Some(description));
        }
        active_model.updated_at = Set(Utc::now());
        let updated = active_model.update(self.db.as_ref()).await?;

        info!(account_id = id, "account updated");
        Ok(updated)
    }

    /// Deactivates an account. Only permitted once the balance is zero so no
    /// funds become unreachable.
    #[instrument(skip(self))]
    pub async fn delete_account(
        &self,
        caller_email: &str,
        account_number: &str,
    ) -> Result<(), ServiceError> {
        let caller_email = caller_email.to_string();
        let account_number = account_number.to_string();

        let deleted_id = self
            .db
            .transaction::<_, i64, ServiceError>(move |txn| {
                Box::pin(async move {
                    let target =
                        find_owned_account_locked(txn, &caller_email, &account_number).await?;
                    if target.balance != Decimal::ZERO {
                        return Err(ServiceError::InvalidInput(
                            "Account balance must be zero before deletion".to_string(),
                        ));
                    }

                    let id = target.id;
                    let mut active_model = target.into_active_model();
                    active_model.active = Set(false);
                    active_model.updated_at = Set(Utc::now());
                    active_model.update(txn).await?;
                    Ok(id)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(account_id = deleted_id, "account deactivated");
        self.emit(Event::AccountDeleted {
            account_id: deleted_id,
        })
        .await;
        Ok(())
    }

    pub async fn get_account(
        &self,
        caller_email: &str,
        account_number: &str,
    ) -> Result<account::Model, ServiceError> {
        find_owned_account(self.db.as_ref(), caller_email, account_number).await
    }

    pub async fn list_accounts(
        &self,
        caller_email: &str,
    ) -> Result<Vec<account::Model>, ServiceError> {
        let owner = find_customer_by_email(self.db.as_ref(), caller_email).await?;
        let accounts = account::Entity::find()
            .filter(account::Column::CustomerId.eq(owner.id))
            .filter(account::Column::Active.eq(true))
            .all(self.db.as_ref())
            .await?;
        Ok(accounts)
    }

    pub async fn get_balance(
        &self,
        caller_email: &str,
        account_number: &str,
    ) -> Result<BalanceResponse, ServiceError> {
        let found = find_owned_account(self.db.as_ref(), caller_email, account_number).await?;
        Ok(BalanceResponse {
            account_number: found.account_number,
            balance: found.balance,
            currency: found.currency,
        })
    }

    /// Adds funds to the caller's account.
    #[instrument(skip(self), fields(%amount))]
    pub async fn deposit(
        &self,
        caller_email: &str,
        account_number: &str,
        amount: Decimal,
    ) -> Result<account::Model, ServiceError> {
        ensure_positive(amount)?;
        let caller_email = caller_email.to_string();
        let account_number = account_number.to_string();

        let updated = self
            .db
            .transaction::<_, account::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let target =
                        find_owned_account_locked(txn, &caller_email, &account_number).await?;
                    credit(txn, target, amount).await
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(account_id = updated.id, "deposit completed");
        self.emit(Event::DepositCompleted {
            account_id: updated.id,
            amount,
        })
        .await;
        Ok(updated)
    }

    /// Removes funds from the caller's account. Fails without side effects
    /// when the balance does not cover the amount.
    #[instrument(skip(self), fields(%amount))]
    pub async fn withdraw(
        &self,
        caller_email: &str,
        account_number: &str,
        amount: Decimal,
    ) -> Result<account::Model, ServiceError> {
        ensure_positive(amount)?;
        let caller_email = caller_email.to_string();
        let account_number = account_number.to_string();

        let updated = self
            .db
            .transaction::<_, account::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let target =
                        find_owned_account_locked(txn, &caller_email, &account_number).await?;
                    debit(txn, target, amount).await
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(account_id = updated.id, "withdrawal completed");
        self.emit(Event::WithdrawalCompleted {
            account_id: updated.id,
            amount,
        })
        .await;
        Ok(updated)
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!("event delivery failed: {}", e);
        }
    }
}

/// Rejects non-positive amounts before any database work.
pub(crate) fn ensure_positive(amount: Decimal) -> Result<(), ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn unwrap_txn_err(err: sea_orm::TransactionError<ServiceError>) -> ServiceError {
    match err {
        sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
        sea_orm::TransactionError::Transaction(e) => e,
    }
}

/// Turns a unique-index violation on an insert into the given conflict
/// error, so races that pass the pre-insert check still surface as 409
/// rather than 500.
pub(crate) fn map_unique_violation(
    err: sea_orm::DbErr,
    conflict: ServiceError,
) -> ServiceError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => conflict,
        _ => ServiceError::DatabaseError(err),
    }
}

pub(crate) async fn find_customer_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<customer::Model, ServiceError> {
    customer::Entity::find()
        .filter(customer::Column::Email.eq(email))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))
}

/// Resolves an active account by its public number.
pub(crate) async fn find_account_by_number<C: ConnectionTrait>(
    conn: &C,
    account_number: &str,
) -> Result<account::Model, ServiceError> {
    account::Entity::find()
        .filter(account::Column::AccountNumber.eq(account_number))
        .filter(account::Column::Active.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Account not found".to_string()))
}

/// Fetches an active account by id under an exclusive row lock.
pub(crate) async fn find_account_by_id_locked<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
) -> Result<account::Model, ServiceError> {
    account::Entity::find_by_id(account_id)
        .filter(account::Column::Active.eq(true))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Account not found".to_string()))
}

pub(crate) async fn find_owned_account<C: ConnectionTrait>(
    conn: &C,
    caller_email: &str,
    account_number: &str,
) -> Result<account::Model, ServiceError> {
    let owner = find_customer_by_email(conn, caller_email).await?;
    let found = find_account_by_number(conn, account_number).await?;
    ensure_owner(&found, owner.id)?;
    Ok(found)
}

/// Owner check plus an exclusive row lock, for mutations. The lock holds
/// until the surrounding transaction commits.
pub(crate) async fn find_owned_account_locked<C: ConnectionTrait>(
    conn: &C,
    caller_email: &str,
    account_number: &str,
) -> Result<account::Model, ServiceError> {
    let owner = find_customer_by_email(conn, caller_email).await?;
    let found = account::Entity::find()
        .filter(account::Column::AccountNumber.eq(account_number))
        .filter(account::Column::Active.eq(true))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Account not found".to_string()))?;
    ensure_owner(&found, owner.id)?;
    Ok(found)
}

pub(crate) fn ensure_owner(found: &account::Model, customer_id: i64) -> Result<(), ServiceError> {
    if found.customer_id != customer_id {
        return Err(ServiceError::Unauthorized(
            "Account does not belong to the authenticated customer".to_string(),
        ));
    }
    Ok(())
}

/// Increases a locked account's balance. Callers must hold the row lock.
pub(crate) async fn credit<C: ConnectionTrait>(
    conn: &C,
    target: account::Model,
    amount: Decimal,
) -> Result<account::Model, ServiceError> {
    let new_balance = target.balance + amount;
    let mut active_model = target.into_active_model();
    active_model.balance = Set(new_balance);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(conn).await?)
}

/// Decreases a locked account's balance, refusing to overdraw.
pub(crate) async fn debit<C: ConnectionTrait>(
    conn: &C,
    target: account::Model,
    amount: Decimal,
) -> Result<account::Model, ServiceError> {
    if target.balance < amount {
        return Err(ServiceError::InsufficientFunds(format!(
            "balance {} does not cover {}",
            target.balance, amount
        )));
    }
    let new_balance = target.balance - amount;
    let mut active_model = target.into_active_model();
    active_model.balance = Set(new_balance);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(conn).await?)
}

/// Generates a fresh numeric account number, retrying on the unlikely
/// collision with an existing one.
pub(crate) async fn generate_unique_account_number<C: ConnectionTrait>(
    conn: &C,
) -> Result<String, ServiceError> {
    for _ in 0..ACCOUNT_NUMBER_ATTEMPTS {
        let candidate = random_account_number();
        let taken = account::Entity::find()
            .filter(account::Column::AccountNumber.eq(candidate.clone()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
    }
    Err(ServiceError::InternalError(
        "could not allocate a unique account number".to_string(),
    ))
}

fn random_account_number() -> String {
    let mut rng = rand::thread_rng();
    (0..ACCOUNT_NUMBER_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_amounts_only() {
        assert!(ensure_positive(dec!(0.01)).is_ok());
        assert!(matches!(
            ensure_positive(Decimal::ZERO),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            ensure_positive(dec!(-5)),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn account_numbers_are_numeric_and_fixed_length() {
        for _ in 0..20 {
            let number = random_account_number();
            assert_eq!(number.len(), ACCOUNT_NUMBER_LEN);
            assert!(number.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn unique_violations_become_conflicts() {
        use sea_orm_migration::MigratorTrait;

        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();

        let now = Utc::now();
        let row = || customer::ActiveModel {
            name: Set("Jane".to_string()),
            email: Set("jane@example.com".to_string()),
            password_hash: Set("hash".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        row().insert(&db).await.unwrap();

        let err = row().insert(&db).await.unwrap_err();
        let mapped =
            map_unique_violation(err, ServiceError::EmailExists("jane@example.com".to_string()));
        assert!(matches!(mapped, ServiceError::EmailExists(_)));

        // Anything other than a unique violation passes through unchanged.
        let mapped = map_unique_violation(
            sea_orm::DbErr::Custom("boom".to_string()),
            ServiceError::EmailExists("jane@example.com".to_string()),
        );
        assert!(matches!(mapped, ServiceError::DatabaseError(_)));
    }

    #[test]
    fn owner_check_rejects_foreign_account() {
        let model = account::Model {
            id: 1,
            account_number: "000000000001".to_string(),
            customer_id: 42,
            account_type: account::AccountType::Savings,
            currency: "USD".to_string(),
            balance: Decimal::ZERO,
            account_name: "Jane".to_string(),
            description: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(ensure_owner(&model, 42).is_ok());
        assert!(matches!(
            ensure_owner(&model, 7),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
