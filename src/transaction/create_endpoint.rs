//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, TransactionType,
    database_id::{AccountId, CategoryId},
    date_range::parse_date,
    transaction::{Transaction, TransactionBuilder, create_transaction},
    user::UserID,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The amount of money, zero or more with at most two decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The date of the transaction, e.g. "2024-01-31".
    pub date: String,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// An optional note.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TransactionRequest {
    /// Convert the request into a builder.
    ///
    /// # Errors
    /// Returns an [Error::InvalidDate] if the date cannot be parsed.
    pub fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let date = parse_date(&self.date)?;

        let mut builder = Transaction::build(
            self.amount,
            self.transaction_type,
            date,
            self.category_id,
            self.account_id,
        );
        builder.note = self.note;
        builder.tags = self.tags;

        Ok(builder)
    }
}

/// A route handler for creating a new transaction, responds with the created
/// transaction and the status code 201.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body?;
    let builder = request.into_builder()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, builder, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}
