//! Code for creating the user table, registering users and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, types::ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, account::seed_default_accounts, category::seed_default_categories};

/// A newtype wrapper for user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(Uuid);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the user signed up with.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id BLOB PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidRequest] if `email` does not look like an email address,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(email: &str, connection: &Connection) -> Result<User, Error> {
    let email = email.trim();

    if !email.contains('@') {
        return Err(Error::InvalidRequest(format!(
            "\"{email}\" is not a valid email address"
        )));
    }

    let id = UserID::new(Uuid::new_v4());

    connection
        .execute(
            "INSERT INTO user (id, email) VALUES (?1, ?2)",
            (id, email),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail(email.to_owned()),
            error => error.into(),
        })?;

    Ok(User {
        id,
        email: email.to_owned(),
    })
}

/// Create a user along with their default accounts and categories.
///
/// Either everything is created or nothing is.
///
/// # Errors
///
/// Returns the same errors as [create_user], or an [Error::SqlError] if the
/// defaults could not be created.
pub fn register_user(email: &str, connection: &Connection) -> Result<User, Error> {
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(email, &transaction)?;
    seed_default_accounts(user.id, &transaction)?;
    seed_default_categories(user.id, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {}", user.id);

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, email FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id)], |row| {
            Ok(User {
                id: UserID::new(row.get(0)?),
                email: row.get(1)?,
            })
        })
        .map_err(|error| error.into())
}
