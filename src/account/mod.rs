//! Accounts that money moves in and out of, e.g. "Cash" or "Card".
//!
//! Balances are never stored. They are derived from the account's
//! transactions every time they are requested.

mod balance;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use balance::{AccountBalance, calculate_balance, calculate_balances};
pub use core::{
    Account, DEFAULT_ACCOUNT_COLOR, create_account, create_account_table, delete_account,
    get_account, get_accounts, seed_default_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use list_endpoint::{AccountWithBalance, get_account_endpoint, list_accounts_endpoint};
