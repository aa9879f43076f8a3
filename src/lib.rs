//! Pocketbook is a web service for tracking personal finances.
//!
//! Users record income and expense transactions against accounts and
//! categories. The service serves a JSON API for managing that ledger and for
//! reading reports derived from it: summary KPIs, a per-category breakdown and
//! a monthly cash-flow series. Reports are recomputed from the ledger on every
//! request.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod category;
mod database_id;
mod date_range;
mod db;
mod endpoints;
mod label;
mod list_response;
mod logging;
mod report;
mod routing;
mod timezone;
mod transaction;
mod transaction_type;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use database_id::{AccountId, CategoryId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction_type::TransactionType;
pub use user::{User, UserID, get_user_by_id, register_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date could not be parsed as an ISO 8601 date.
    #[error("invalid date \"{0}\", expected a date such as 2024-01-31")]
    InvalidDate(String),

    /// The start of a date range falls after its end.
    #[error("from ({from}) must not be after to ({to})")]
    InvalidDateRange {
        /// The start of the range.
        from: time::Date,
        /// The end of the range.
        to: time::Date,
    },

    /// A transaction type other than "income" or "expense" was given.
    #[error("invalid type \"{0}\", expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// A month could not be parsed in the `YYYY-MM` format.
    #[error("invalid month \"{0}\", expected the format YYYY-MM")]
    InvalidMonth(String),

    /// The number of months for a cash-flow series is not a supported value.
    #[error("months must be an integer between 1 and {max}, got \"{value}\"")]
    InvalidMonthCount {
        /// The value the client sent.
        value: String,
        /// The largest number of months allowed.
        max: u32,
    },

    /// A transaction amount was negative or had too many decimal places.
    #[error("invalid amount {0}, amounts must be zero or more with at most two decimal places")]
    InvalidAmount(rust_decimal::Decimal),

    /// A name was empty or only contained whitespace.
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    /// A name was longer than allowed.
    #[error("{0} name cannot be longer than {1} characters")]
    NameTooLong(&'static str, usize),

    /// A color was not a hex color such as `#1a2b3c`.
    #[error("invalid color \"{0}\", expected a hex color such as #1a2b3c")]
    InvalidColor(String),

    /// A transaction note was longer than allowed.
    #[error("notes cannot be longer than {0} characters")]
    NoteTooLong(usize),

    /// A bulk operation was requested without any IDs.
    #[error("at least one transaction ID is required")]
    EmptyBatch,

    /// A bulk operation was requested with more IDs than allowed.
    #[error("cannot update more than {max} transactions at once, got {count}")]
    BatchTooLarge {
        /// The number of distinct IDs in the request.
        count: usize,
        /// The largest batch allowed.
        max: usize,
    },

    /// The request body or query string could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Resources that exist but belong to another user are reported the same
    /// way so that clients cannot discover other users' records.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category ID does not refer to one of the user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// The account ID does not refer to one of the user's accounts.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount,

    /// The type of a transaction does not match the type of its category.
    #[error(
        "a transaction of type {transaction_type} cannot use a category of type {category_type}"
    )]
    TypeMismatch {
        /// The type of the transaction.
        transaction_type: TransactionType,
        /// The type of the category.
        category_type: TransactionType,
    },

    /// Some transactions in a bulk reassignment do not match the target category's type.
    #[error("{} transaction(s) do not match the category type {category_type}: {}", .ids.len(), format_ids(.ids))]
    BatchTypeMismatch {
        /// The type of the target category.
        category_type: TransactionType,
        /// The IDs of the transactions whose type differs from the category.
        ids: Vec<TransactionId>,
    },

    /// The user already has an account with the same name.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// The user already has a category with the same name and type.
    #[error("the {1} category \"{0}\" already exists")]
    DuplicateCategoryName(String, TransactionType),

    /// The user already exists.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// Tried to delete an account that transactions still refer to.
    #[error("the account still has transactions, move or delete them first")]
    AccountInUse,

    /// Tried to delete a category that transactions still refer to.
    #[error("the category still has transactions, move or delete them first")]
    CategoryInUse,

    /// Tried to delete one of the categories created at sign up.
    #[error("default categories cannot be deleted")]
    SystemCategory,

    /// The request did not carry a valid, unexpired auth cookie.
    #[error("you must be logged in to access this resource")]
    Unauthorized,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A running total grew too large to represent.
    #[error("a total was too large to compute")]
    AmountOverflow,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

fn format_ids(ids: &[TransactionId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl Error {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidDate(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidTransactionType(_)
            | Error::InvalidMonth(_)
            | Error::InvalidMonthCount { .. }
            | Error::InvalidAmount(_)
            | Error::EmptyName(_)
            | Error::NameTooLong(..)
            | Error::InvalidColor(_)
            | Error::NoteTooLong(_)
            | Error::EmptyBatch
            | Error::BatchTooLarge { .. }
            | Error::InvalidRequest(_)
            | Error::SystemCategory => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::TypeMismatch { .. } | Error::BatchTypeMismatch { .. } => {
                (StatusCode::BAD_REQUEST, "TYPE_MISMATCH")
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::InvalidCategory => (StatusCode::NOT_FOUND, "INVALID_CATEGORY"),
            Error::InvalidAccount => (StatusCode::NOT_FOUND, "INVALID_ACCOUNT"),
            Error::DuplicateAccountName(_)
            | Error::DuplicateCategoryName(..)
            | Error::DuplicateEmail(_)
            | Error::AccountInUse
            | Error::CategoryInUse => (StatusCode::CONFLICT, "CONFLICT"),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::JSONSerializationError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::AmountOverflow
            | Error::InvalidTimezoneError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The details of internal errors are only intended for the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}
