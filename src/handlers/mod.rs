//! HTTP surface. Handlers validate input, delegate to services, and shape
//! responses; they never contain business rules.

use std::sync::Arc;

use crate::services::{
    AccountService, CustomerService, TransactionQueryService, TransferService,
};

pub mod accounts;
pub mod auth;
pub mod common;
pub mod customers;
pub mod transfers;

/// Service bundle shared through application state.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub transfers: Arc<TransferService>,
    pub transactions: Arc<TransactionQueryService>,
    pub customers: Arc<CustomerService>,
}

impl AppServices {
    pub fn new(
        accounts: AccountService,
        transfers: TransferService,
        transactions: TransactionQueryService,
        customers: CustomerService,
    ) -> Self {
        Self {
            accounts: Arc::new(accounts),
            transfers: Arc::new(transfers),
            transactions: Arc::new(transactions),
            customers: Arc::new(customers),
        }
    }
}
