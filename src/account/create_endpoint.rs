//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{AccountBalance, AccountWithBalance, DEFAULT_ACCOUNT_COLOR, create_account},
    label::{Color, Name},
    user::UserID,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating an account.
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    /// The account name.
    pub name: String,
    /// The color as `#rrggbb`, defaults to blue.
    pub color: Option<String>,
}

/// A route handler for creating a new account, responds with the account and the status code 201.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body?;
    let name = Name::new(&request.name, "account")?;
    let color = Color::new(request.color.as_deref().unwrap_or(DEFAULT_ACCOUNT_COLOR))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = create_account(user_id, name, color, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(AccountWithBalance::new(account, AccountBalance::default())),
    )
        .into_response())
}
