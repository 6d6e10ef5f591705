//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The JSON endpoints for transactions

mod core;
mod handlers;
mod query;

pub use core::{
    Transaction, TransactionBuilder, TransactionId, create_transaction, create_transaction_table,
    delete_transaction, get_all_transactions, get_transaction, map_transaction_row,
    update_transaction, validate_amount,
};
pub use handlers::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use query::list_transactions;
