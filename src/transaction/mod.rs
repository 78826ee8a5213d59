//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating transactions
//! - Database functions for storing, listing, deleting and summarizing transactions
//! - Route handlers for the transaction API

mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod list_endpoint;
mod summary;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table,
    delete_transaction, from_cents, get_transactions_by_user, to_cents,
};
pub use create_transaction_endpoint::{CreateTransactionRequest, create_transaction_endpoint};
pub use delete_transaction_endpoint::{DeleteTransactionResponse, delete_transaction_endpoint};
pub use list_endpoint::get_transactions_endpoint;
pub use summary::{Summary, get_summary, get_summary_endpoint};

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
