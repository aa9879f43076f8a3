//! Deletes categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, category::delete_category, database_id::CategoryId, user::UserID,
};

/// The state needed to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a category, responds with 204 No Content.
///
/// Default categories and categories that transactions still use cannot be deleted.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
    category_id: Result<Path<CategoryId>, PathRejection>,
) -> Result<Response, Error> {
    let Path(category_id) = category_id?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(user_id, category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
