//! Transactions module - payment records, filtering and paging.

mod transactions_model;
mod transactions_service;
mod transactions_traits;

#[cfg(test)]
pub(crate) mod testing;

pub use transactions_model::{
    CreateTransaction, NewTransaction, Page, PageRequest, PaymentMethod, Transaction,
    TransactionCategory, TransactionFilter, TransactionPage, TransactionStatus,
    TransactionStatusUpdate,
};
pub(crate) use transactions_service::owned_transaction;
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
