//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder for creating transactions
//! - Database functions for storing, querying, and summarizing transactions
//! - Route handlers for the transactions JSON API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;

pub use core::{
    CategoryTotal, DATE_FORMAT, DEFAULT_USER_ID, NewTransaction, Transaction, TransactionPatch,
    TransactionType, create_transaction, create_transaction_table, delete_transaction,
    get_transaction, insert_transaction, list_transactions, map_transaction_row, parse_date,
    summarize_by_category, update_transaction,
};
pub use create_endpoint::{CreateTransactionBody, create_transaction_endpoint};
pub use delete_endpoint::{DeleteResponse, delete_transaction_endpoint};
pub use edit_endpoint::{EditTransactionBody, edit_transaction_endpoint};
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::{list_transactions_endpoint, transaction_summary_endpoint};

#[cfg(test)]
pub use core::count_transactions;
