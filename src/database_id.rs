//! Database ID type definitions.

use uuid::Uuid;

use crate::Error;

/// Alias for the type used for mapping to database IDs.
///
/// IDs are random (v4) UUIDs so that they cannot be guessed or enumerated by
/// clients. SQLite stores them as 16 byte blobs.
pub type DatabaseId = Uuid;
/// The ID of an account.
pub type AccountId = DatabaseId;
/// The ID of a category.
pub type CategoryId = DatabaseId;
/// The ID of a transaction.
pub type TransactionId = DatabaseId;

/// Create a new, random database ID.
pub fn new_id() -> DatabaseId {
    Uuid::new_v4()
}

/// Parse an optional ID from a query string, e.g. `?categoryId=...`.
///
/// A missing or empty value means no ID was given.
///
/// # Errors
/// Returns an [Error::InvalidRequest] naming `field` if the value is not a UUID.
pub fn parse_optional_id(value: Option<&str>, field: &str) -> Result<Option<DatabaseId>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| Error::InvalidRequest(format!("{field} \"{value}\" is not a valid ID"))),
    }
}
