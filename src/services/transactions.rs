use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder};

use crate::db::DbPool;
use crate::dto::{TransactionPageResponse, TransactionResponse};
use crate::entities::transaction;
use crate::errors::ServiceError;
use crate::services::accounts::find_owned_account;

const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Columns clients may sort transaction history by. Anything else is
/// rejected up front rather than interpolated into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    CreatedAt,
    AmountTransferred,
}

impl SortField {
    fn column(self) -> transaction::Column {
        match self {
            Self::Id => transaction::Column::Id,
            Self::CreatedAt => transaction::Column::CreatedAt,
            Self::AmountTransferred => transaction::Column::AmountTransferred,
        }
    }
}

impl FromStr for SortField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "created_at" => Ok(Self::CreatedAt),
            "amount_transferred" => Ok(Self::AmountTransferred),
            other => Err(ServiceError::ValidationError(format!(
                "Cannot sort by '{}'; allowed fields: id, created_at, amount_transferred",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Zero-based page index.
    pub page_no: u64,
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub descending: bool,
}

/// Read side of the ledger: paginated, sorted transaction history for one
/// account. Purely read-only; repeating a query never changes its result
/// apart from newly committed transfers.
pub struct TransactionQueryService {
    db: Arc<DbPool>,
}

impl TransactionQueryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn history(
        &self,
        caller_email: &str,
        account_number: &str,
        query: HistoryQuery,
    ) -> Result<TransactionPageResponse, ServiceError> {
        let owned = find_owned_account(self.db.as_ref(), caller_email, account_number).await?;

        let sort_field = match query.sort_by.as_deref() {
            Some(raw) => raw.parse::<SortField>()?,
            None => SortField::CreatedAt,
        };
        let order = if query.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let paginator = transaction::Entity::find()
            .filter(transaction::Column::SenderAccountId.eq(owned.id))
            .order_by(sort_field.column(), order)
            .paginate(self.db.as_ref(), page_size);

        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(query.page_no).await?;

        Ok(TransactionPageResponse {
            transactions: items.into_iter().map(TransactionResponse::from).collect(),
            page_number: query.page_no,
            page_size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
            is_last: totals.number_of_pages == 0 || query.page_no >= totals.number_of_pages - 1,
        })
    }
}
