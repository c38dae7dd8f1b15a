pub mod account;
pub mod customer;
pub mod favorite_recipient;
pub mod transaction;
