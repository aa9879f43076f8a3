//! Lists a user's categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, TransactionType, category::get_categories, list_response::ListResponse,
    user::UserID,
};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    #[serde(rename = "type")]
    category_type: Option<String>,
}

/// Respond with the user's categories, optionally only those of one type.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<CategoriesQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let category_type = TransactionType::parse_filter(query.category_type.as_deref())?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, category_type, &connection)?;

    Ok(Json(ListResponse::from(categories)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        endpoints,
        test_utils::{TestApp, assert_error_code},
    };

    #[tokio::test]
    async fn lists_expense_categories() {
        let app = TestApp::new();

        let response = app
            .server
            .get(endpoints::CATEGORIES)
            .add_query_param("type", "expense")
            .add_cookie(app.auth_cookie())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let categories = body["data"].as_array().unwrap();
        assert_eq!(categories.len(), 8);
        assert!(categories.iter().all(|category| category["type"] == "expense"));
        assert!(categories.iter().all(|category| category["isSystem"] == true));
    }

    #[tokio::test]
    async fn empty_type_lists_everything() {
        let app = TestApp::new();

        let response = app
            .server
            .get(endpoints::CATEGORIES)
            .add_query_param("type", "")
            .add_cookie(app.auth_cookie())
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn rejects_unknown_type() {
        let app = TestApp::new();

        let response = app
            .server
            .get(endpoints::CATEGORIES)
            .add_query_param("type", "Expense")
            .add_cookie(app.auth_cookie())
            .await;

        assert_error_code(&response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    }
}
