//! Defines the endpoints for reading transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, TransactionType,
    database_id::{TransactionId, parse_optional_id},
    date_range::DateRange,
    list_response::ListResponse,
    transaction::{TransactionFilter, get_transaction, get_transactions},
    user::UserID,
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw query parameters for listing transactions.
///
/// Values are kept as strings so that empty values can be treated as absent
/// and bad values produce a descriptive error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    from: Option<String>,
    to: Option<String>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    category_id: Option<String>,
    account_id: Option<String>,
}

impl TransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, Error> {
        Ok(TransactionFilter {
            date_range: DateRange::parse(self.from.as_deref(), self.to.as_deref())?,
            transaction_type: TransactionType::parse_filter(self.transaction_type.as_deref())?,
            category_id: parse_optional_id(self.category_id.as_deref(), "categoryId")?,
            account_id: parse_optional_id(self.account_id.as_deref(), "accountId")?,
        })
    }
}

/// A route handler for listing the user's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &filter, &connection)?;

    Ok(Json(ListResponse::from(transactions)).into_response())
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Result<Response, Error> {
    let Path(transaction_id) = transaction_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(user_id, transaction_id, &connection)?;

    Ok(Json(transaction).into_response())
}
