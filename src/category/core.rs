//! Defines the category model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, TransactionType,
    database_id::{CategoryId, new_id},
    label::{Color, Name},
    user::UserID,
};

/// A label for transactions, e.g. "Food" or "Salary".
///
/// A category is either for income or for expenses, and its type cannot change
/// once it has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    #[serde(skip)]
    pub user_id: Option<UserID>,
    /// The display name of the category.
    pub name: Name,
    /// Whether the category is used for income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// The color clients use to draw the category.
    pub color: Color,
    /// Whether this is one of the categories created at sign up.
    pub is_system: bool,
}

/// The categories every new user starts with: name, type and color.
const DEFAULT_CATEGORIES: [(&str, TransactionType, &str); 12] = [
    ("Food", TransactionType::Expense, "#ef4444"),
    ("Transport", TransactionType::Expense, "#f97316"),
    ("Housing", TransactionType::Expense, "#eab308"),
    ("Utilities", TransactionType::Expense, "#84cc16"),
    ("Entertainment", TransactionType::Expense, "#a855f7"),
    ("Health", TransactionType::Expense, "#ec4899"),
    ("Shopping", TransactionType::Expense, "#06b6d4"),
    ("Other", TransactionType::Expense, "#6b7280"),
    ("Salary", TransactionType::Income, "#22c55e"),
    ("Freelance", TransactionType::Income, "#14b8a6"),
    ("Investments", TransactionType::Income, "#3b82f6"),
    ("Other", TransactionType::Income, "#64748b"),
];

const CATEGORY_COLUMNS: &str = "id, user_id, name, type, color, is_system";

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            color TEXT NOT NULL,
            is_system INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_user_type_name
            ON category(user_id, type, name COLLATE NOCASE);",
    )?;

    Ok(())
}

/// Create a new category for `user_id`.
///
/// # Errors
/// Returns an [Error::DuplicateCategoryName] if the user already has a category
/// of the same type with the same name, ignoring case, or an [Error::SqlError]
/// if there is some other SQL error.
pub fn create_category(
    user_id: UserID,
    name: Name,
    category_type: TransactionType,
    color: Color,
    connection: &Connection,
) -> Result<Category, Error> {
    insert_category(user_id, name, category_type, color, false, connection)
}

fn insert_category(
    user_id: UserID,
    name: Name,
    category_type: TransactionType,
    color: Color,
    is_system: bool,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category ({CATEGORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (new_id(), user_id, &name, category_type, &color, is_system),
            map_category_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string(), category_type),
            error => error.into(),
        })
}

/// Create the default categories for a newly registered user.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    for (name, category_type, color) in DEFAULT_CATEGORIES {
        insert_category(
            user_id,
            Name::new_unchecked(name),
            category_type,
            Color::new_unchecked(color),
            true,
            connection,
        )?;
    }

    Ok(())
}

/// Retrieve the category `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    user_id: UserID,
    id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_category_row)
        .map_err(Error::from)
}

/// Retrieve the categories owned by `user_id`, optionally only those of one type.
///
/// Categories are ordered by type and then alphabetically by name.
pub fn get_categories(
    user_id: UserID,
    category_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut statement = connection.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM category
         WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
         ORDER BY type ASC, name COLLATE NOCASE ASC"
    ))?;

    statement
        .query_map((user_id, category_type), map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Delete the category `id` owned by `user_id`.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if the category does not exist or belongs to another user,
/// - [Error::SystemCategory] if it is one of the default categories,
/// - [Error::CategoryInUse] if transactions still refer to it,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_category(user_id: UserID, id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let category = get_category(user_id, id, &transaction)?;

    if category.is_system {
        return Err(Error::SystemCategory);
    }

    let in_use: bool = transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE category_id = ?1)",
        (id,),
        |row| row.get(0),
    )?;
    if in_use {
        return Err(Error::CategoryInUse);
    }

    transaction
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (id, user_id),
        )
        .map_err(|error| match error {
            // A restricted delete fails with SQLITE_CONSTRAINT_TRIGGER, not FOREIGNKEY.
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ErrorCode::ConstraintViolation,
                    ..
                },
                _,
            ) => Error::CategoryInUse,
            error => error.into(),
        })?;

    transaction.commit()?;

    Ok(())
}

/// Map a database row to a [Category].
///
/// The row must contain the columns `id, user_id, name, type, color, is_system` in that order.
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: Some(UserID::new(row.get(1)?)),
        name: row.get(2)?,
        category_type: row.get(3)?,
        color: row.get(4)?,
        is_system: row.get(5)?,
    })
}
