//! Moves a batch of transactions to another category in one step.
//!
//! The batch is validated as a whole before any row is touched: if a single
//! transaction does not match the type of the target category, nothing is
//! updated and the caller is told exactly which transactions were at fault.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, TransactionType,
    category::get_category,
    database_id::{CategoryId, TransactionId},
    user::UserID,
};

/// The most transactions that can be reassigned in one request.
pub const MAX_BATCH_SIZE: usize = 100;

/// The state needed to reassign transactions.
#[derive(Debug, Clone)]
pub struct BulkReassignState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BulkReassignState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for a bulk reassignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReassignRequest {
    /// The transactions to move.
    pub ids: Vec<TransactionId>,
    /// The category to move them to.
    pub category_id: CategoryId,
}

/// The outcome of a bulk reassignment.
#[derive(Debug, Serialize, PartialEq)]
pub struct BulkReassignResponse {
    /// The number of transactions that were moved.
    pub updated: usize,
    /// A human readable summary.
    pub message: String,
}

/// A route handler for moving many transactions to one category.
pub async fn bulk_reassign_endpoint(
    State(state): State<BulkReassignState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<BulkReassignRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let updated = reassign_category(user_id, &request.ids, request.category_id, &connection)?;

    tracing::info!(
        "Moved {updated} transaction(s) to category {}",
        request.category_id
    );

    Ok(Json(BulkReassignResponse {
        updated,
        message: format!("Updated {updated} transaction(s)"),
    })
    .into_response())
}

/// Move the transactions `ids` owned by `user_id` to the category `category_id`.
///
/// Repeated IDs are counted once. IDs that do not refer to one of the user's
/// transactions are skipped. Returns the number of transactions that were updated.
///
/// # Errors
/// Returns a:
/// - [Error::EmptyBatch] if `ids` is empty,
/// - [Error::BatchTooLarge] if there are more than [MAX_BATCH_SIZE] distinct IDs,
/// - [Error::InvalidCategory] if the category does not exist or belongs to another user,
/// - [Error::BatchTypeMismatch] listing the transactions whose type differs from the category,
/// - [Error::SqlError] if there is some other SQL error.
///
/// No transaction is modified when an error is returned.
pub fn reassign_category(
    user_id: UserID,
    ids: &[TransactionId],
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    let mut seen = HashSet::with_capacity(ids.len());
    let distinct_ids: Vec<TransactionId> = ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if distinct_ids.is_empty() {
        return Err(Error::EmptyBatch);
    }

    if distinct_ids.len() > MAX_BATCH_SIZE {
        return Err(Error::BatchTooLarge {
            count: distinct_ids.len(),
            max: MAX_BATCH_SIZE,
        });
    }

    let transaction = connection.unchecked_transaction()?;

    let category = get_category(user_id, category_id, &transaction).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })?;

    let owned = get_transaction_types(user_id, &distinct_ids, &transaction)?;

    let mismatched: Vec<TransactionId> = owned
        .iter()
        .filter(|(_, transaction_type)| *transaction_type != category.category_type)
        .map(|(id, _)| *id)
        .collect();

    if !mismatched.is_empty() {
        return Err(Error::BatchTypeMismatch {
            category_type: category.category_type,
            ids: mismatched,
        });
    }

    let mut updated = 0;
    {
        let mut statement = transaction.prepare(
            "UPDATE \"transaction\" SET category_id = ?1 WHERE id = ?2 AND user_id = ?3",
        )?;

        for (id, _) in &owned {
            updated += statement.execute((category_id, id, user_id))?;
        }
    }

    transaction.commit()?;

    Ok(updated)
}

/// Get the type of each transaction in `ids` that `user_id` owns, in the order of `ids`.
fn get_transaction_types(
    user_id: UserID,
    ids: &[TransactionId],
    connection: &Connection,
) -> Result<Vec<(TransactionId, TransactionType)>, Error> {
    let mut statement =
        connection.prepare("SELECT type FROM \"transaction\" WHERE id = ?1 AND user_id = ?2")?;
    let mut owned = Vec::with_capacity(ids.len());

    for id in ids {
        let transaction_type: Option<TransactionType> = statement
            .query_row((id, user_id), |row| row.get(0))
            .optional()?;

        if let Some(transaction_type) = transaction_type {
            owned.push((*id, transaction_type));
        }
    }

    Ok(owned)
}
