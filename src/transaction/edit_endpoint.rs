//! Defines the endpoint for replacing the fields of a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{TransactionRequest, update_transaction},
    user::UserID,
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing a transaction, responds with the updated transaction.
///
/// The body has the same shape as when creating a transaction and is validated the same way.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
    body: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Path(transaction_id) = transaction_id?;
    let Json(request) = body?;
    let builder = request.into_builder()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = update_transaction(user_id, transaction_id, builder, &connection)?;

    Ok(Json(transaction).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, assert_error_code},
    };

    #[tokio::test]
    async fn updates_transaction() {
        let app = TestApp::new();
        let transaction = app.with_connection(|connection| {
            app.ledger.expense(dec!(5), date!(2024 - 01 - 05), connection)
        });

        let response = app
            .server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_cookie(app.auth_cookie())
            .json(&json!({
                "amount": 7.5,
                "type": "expense",
                "date": "2024-01-06",
                "categoryId": app.ledger.transport,
                "accountId": app.ledger.card,
                "note": "Bus",
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], json!(transaction.id));
        assert_eq!(body["amount"], json!(7.5));
        assert_eq!(body["categoryId"], json!(app.ledger.transport));
        assert_eq!(body["note"], "Bus");
    }

    #[tokio::test]
    async fn update_rejects_negative_amount() {
        let app = TestApp::new();
        let transaction = app.with_connection(|connection| {
            app.ledger.expense(dec!(5), date!(2024 - 01 - 05), connection)
        });

        let response = app
            .server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_cookie(app.auth_cookie())
            .json(&json!({
                "amount": -5,
                "type": "expense",
                "date": "2024-01-05",
                "categoryId": app.ledger.food,
                "accountId": app.ledger.cash,
            }))
            .await;

        assert_error_code(&response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    }
}
