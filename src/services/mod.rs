//! Business logic. Handlers stay thin; every rule about money movement,
//! ownership, and uniqueness lives in these services.

pub mod accounts;
pub mod currency;
pub mod customers;
pub mod transactions;
pub mod transfers;

pub use accounts::AccountService;
pub use currency::{CurrencyConverter, ExchangeRateClient, FixedRateConverter};
pub use customers::CustomerService;
pub use transactions::TransactionQueryService;
pub use transfers::TransferService;
