//! Creates categories.

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
    AppState, Error, TransactionType,
    category::create_category,
    label::{Color, Name},
    user::UserID,
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    name: String,
    #[serde(rename = "type")]
    category_type: TransactionType,
    color: Option<String>,
}

/// Create a category and respond with it and the status code 201.
///
/// Categories without a color get the neutral color.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body?;
    let name = Name::new(&request.name, "category")?;
    let color = match request.color.as_deref() {
        Some(color) => Color::new(color)?,
        None => Color::neutral(),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(user_id, name, request.category_type, color, &connection)?;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}
