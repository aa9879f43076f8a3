//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - JSON endpoints for the transaction CRUD operations
//! - Bulk reassignment of transactions to another category

mod bulk_reassign;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use bulk_reassign::bulk_reassign_endpoint;
pub use core::{
    Transaction, TransactionBuilder, TransactionFilter, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
    update_transaction,
};
pub use create_endpoint::{TransactionRequest, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use list_endpoint::{get_transaction_endpoint, list_transactions_endpoint};
