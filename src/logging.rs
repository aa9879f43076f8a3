//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::user::UserID;

/// Log one line for each request once its response is ready.
///
/// The line holds the method, the matched route (or the raw path when no route
/// matched), the response status, how long the request took in milliseconds,
/// and the user ID if the request was authenticated.
///
/// Server errors are logged at the `error` level, client errors at `warn` and
/// everything else at `info`. Bodies are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();
    let user_id = response
        .extensions()
        .get::<UserID>()
        .map(|user_id| user_id.to_string())
        .unwrap_or_else(|| "-".to_owned());

    match log_level(status) {
        tracing::Level::ERROR => tracing::error!(
            "{method} {route} -> {} in {duration_ms}ms (user: {user_id})",
            status.as_u16()
        ),
        tracing::Level::WARN => tracing::warn!(
            "{method} {route} -> {} in {duration_ms}ms (user: {user_id})",
            status.as_u16()
        ),
        _ => tracing::info!(
            "{method} {route} -> {} in {duration_ms}ms (user: {user_id})",
            status.as_u16()
        ),
    }

    response
}

fn log_level(status: StatusCode) -> tracing::Level {
    if status.is_server_error() {
        tracing::Level::ERROR
    } else if status.is_client_error() {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    }
}
