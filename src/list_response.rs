//! The JSON envelope used by endpoints that return a collection.

use serde::Serialize;

/// A collection of items wrapped as `{"data": [...]}`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    /// The items in the collection.
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}
