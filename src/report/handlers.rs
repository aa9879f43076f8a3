//! Report route handlers.
//!
//! Each handler parses its query parameters, loads the matching slice of the
//! user's ledger while holding the database lock once, and hands the
//! transactions to the pure aggregation functions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, TransactionType,
    category::get_categories,
    date_range::DateRange,
    list_response::ListResponse,
    report::{
        CashFlowWindow, YearMonth, break_down_by_category, cash_flow, parse_month_count,
        summarize,
    },
    timezone::local_today,
    transaction::{TransactionFilter, get_transactions},
    user::UserID,
};

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters shared by the summary and category reports.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    from: Option<String>,
    to: Option<String>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
}

impl PeriodQuery {
    fn into_filter(self) -> Result<TransactionFilter, Error> {
        Ok(TransactionFilter {
            date_range: DateRange::parse(self.from.as_deref(), self.to.as_deref())?,
            transaction_type: TransactionType::parse_filter(self.transaction_type.as_deref())?,
            ..Default::default()
        })
    }
}

/// The query parameters for the cash-flow report.
#[derive(Debug, Default, Deserialize)]
pub struct CashFlowQuery {
    start: Option<String>,
    months: Option<String>,
}

/// Respond with the total income, total expenses, net and transaction count
/// for an optional date range and type.
pub async fn get_summary_report(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &filter, &connection)?;

    Ok(Json(summarize(&transactions)?).into_response())
}

/// Respond with the totals per category, largest first.
pub async fn get_category_report(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &filter, &connection)?;
    let categories = get_categories(user_id, None, &connection)?;

    Ok(Json(break_down_by_category(&transactions, &categories)?).into_response())
}

/// Respond with the income, expenses and net for each month in a window.
///
/// Without a `start` month, the window ends with the current month in the
/// server's timezone.
pub async fn get_cash_flow_report(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let months = parse_month_count(query.months.as_deref())?;

    let window = match query.start.as_deref().map(str::trim) {
        None | Some("") => CashFlowWindow::ending_at(local_today(&state.local_timezone)?, months)?,
        Some(start) => CashFlowWindow::starting_at(start.parse::<YearMonth>()?, months)?,
    };

    let filter = TransactionFilter {
        date_range: window.date_range()?,
        ..Default::default()
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &filter, &connection)?;

    Ok(Json(ListResponse::from(cash_flow(&transactions, &window)?)).into_response())
}
