//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState, Error,
    account::{
        create_account_endpoint, delete_account_endpoint, get_account_endpoint,
        list_accounts_endpoint,
    },
    auth::auth_guard,
    category::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint},
    endpoints,
    logging::logging_middleware,
    report::{get_cash_flow_report, get_category_report, get_summary_report},
    transaction::{
        bulk_reassign_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::COFFEE, get(get_coffee));

    let protected_routes = Router::new()
        .route(endpoints::SUMMARY_REPORT, get(get_summary_report))
        .route(endpoints::CATEGORY_REPORT, get(get_category_report))
        .route(endpoints::CASH_FLOW_REPORT, get(get_cash_flow_report))
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint).delete(delete_account_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::BULK_CATEGORY, post(bulk_reassign_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

/// The root path '/' redirects to the summary report.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::SUMMARY_REPORT)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
