//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, account::delete_account, database_id::AccountId, user::UserID};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account, responds with 204 No Content.
///
/// Accounts that still have transactions cannot be deleted.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserID>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, Error> {
    let Path(account_id) = account_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_account(user_id, account_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not delete account {account_id}: {error}"))?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, assert_error_code},
    };

    #[tokio::test]
    async fn deletes_unused_account() {
        let app = TestApp::new();

        app.server
            .delete(&format_endpoint(endpoints::ACCOUNT, app.ledger.card))
            .add_cookie(app.auth_cookie())
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn account_with_transactions_conflicts() {
        let app = TestApp::new();
        app.with_connection(|connection| {
            app.ledger.expense(dec!(1), date!(2024 - 01 - 05), connection);
        });

        let response = app
            .server
            .delete(&format_endpoint(endpoints::ACCOUNT, app.ledger.cash))
            .add_cookie(app.auth_cookie())
            .await;

        assert_error_code(&response, StatusCode::CONFLICT, "CONFLICT");
    }
}
