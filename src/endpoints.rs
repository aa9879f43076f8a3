//! The API endpoints URIs.
//!
//! Endpoints that take a parameter, e.g., '/api/accounts/{account_id}', are
//! filled in by the tests with `format_endpoint`.

/// The root route which redirects to the summary report.
pub const ROOT: &str = "/";
/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";

/// The route for the headline totals over a period.
pub const SUMMARY_REPORT: &str = "/api/reports/summary";
/// The route for the per-category breakdown over a period.
pub const CATEGORY_REPORT: &str = "/api/reports/categories";
/// The route for the month-by-month cash-flow series.
pub const CASH_FLOW_REPORT: &str = "/api/reports/cash-flow";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to access a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to move many transactions to another category at once.
pub const BULK_CATEGORY: &str = "/api/transactions/bulk-category";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/accounts/{account_id}', '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
