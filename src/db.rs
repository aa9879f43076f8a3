//! Sets up the application database.

use rusqlite::Connection;

use crate::{
    account::create_account_table, category::create_category_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create all the tables for the domain models, if they do not already exist.
///
/// Foreign key enforcement is enabled for `connection` since ownership and
/// the "cannot delete while referenced" rules rely on it.
///
/// # Errors
/// Returns an error if a table cannot be created or there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
