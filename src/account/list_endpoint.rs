//! Defines the endpoints for reading accounts and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    AppState, Error,
    account::{Account, AccountBalance, calculate_balance, calculate_balances, get_account, get_accounts},
    database_id::AccountId,
    list_response::ListResponse,
    transaction::{TransactionFilter, get_transactions},
    user::UserID,
};

/// The state needed to read accounts.
#[derive(Debug, Clone)]
pub struct ListAccountsState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct TransactionCount {
    txns: usize,
}

/// An account as sent to clients, with its derived balance.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountWithBalance {
    #[serde(flatten)]
    account: Account,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
    #[serde(rename = "_count")]
    count: TransactionCount,
}

impl AccountWithBalance {
    /// Attach a balance to an account.
    pub fn new(account: Account, balance: AccountBalance) -> Self {
        Self {
            account,
            balance: balance.balance,
            count: TransactionCount {
                txns: balance.transaction_count,
            },
        }
    }
}

/// Respond with all of the user's accounts and their balances.
pub async fn list_accounts_endpoint(
    State(state): State<ListAccountsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_accounts(user_id, &connection)?;
    let transactions = get_transactions(user_id, &TransactionFilter::default(), &connection)?;
    let balances = calculate_balances(&transactions)?;

    let accounts: Vec<AccountWithBalance> = accounts
        .into_iter()
        .map(|account| {
            let balance = balances.get(&account.id).copied().unwrap_or_default();
            AccountWithBalance::new(account, balance)
        })
        .collect();

    Ok(Json(ListResponse::from(accounts)).into_response())
}

/// Respond with a single account and its balance.
pub async fn get_account_endpoint(
    State(state): State<ListAccountsState>,
    Extension(user_id): Extension<UserID>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, Error> {
    let Path(account_id) = account_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(user_id, account_id, &connection)?;
    let transactions = get_transactions(
        user_id,
        &TransactionFilter {
            account_id: Some(account_id),
            ..Default::default()
        },
        &connection,
    )?;

    let balance = calculate_balance(&transactions)?;

    Ok(Json(AccountWithBalance::new(account, balance)).into_response())
}
