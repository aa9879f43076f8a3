use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{AccountId, new_id},
    label::{Color, Name},
    user::UserID,
};

/// The color given to accounts created without one.
pub const DEFAULT_ACCOUNT_COLOR: &str = "#3b82f6";

/// The accounts every new user starts with.
const DEFAULT_ACCOUNTS: [(&str, &str); 2] = [("Cash", "#22c55e"), ("Card", DEFAULT_ACCOUNT_COLOR)];

/// A place money is kept, such as a wallet or a bank card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    #[serde(skip)]
    pub user_id: Option<UserID>,
    /// The name of the account, unique per user ignoring case.
    pub name: Name,
    /// The color clients use to draw the account.
    pub color: Color,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#3b82f6',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_account_user_name
            ON account(user_id, name COLLATE NOCASE);",
    )?;

    Ok(())
}

/// Create a new account for `user_id`.
///
/// # Errors
/// Returns an [Error::DuplicateAccountName] if the user already has an account
/// with the same name, ignoring case, or an [Error::SqlError] if there is some
/// other SQL error.
pub fn create_account(
    user_id: UserID,
    name: Name,
    color: Color,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO account (id, user_id, name, color) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, color",
        )?
        .query_row((new_id(), user_id, &name, &color), map_account_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(name.to_string()),
            error => error.into(),
        })
}

/// Create the default accounts for a newly registered user.
pub fn seed_default_accounts(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    for (name, color) in DEFAULT_ACCOUNTS {
        create_account(
            user_id,
            Name::new_unchecked(name),
            Color::new_unchecked(color),
            connection,
        )?;
    }

    Ok(())
}

/// Retrieve the account `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_account(user_id: UserID, id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, user_id, name, color FROM account WHERE id = ?1 AND user_id = ?2")?
        .query_row((id, user_id), map_account_row)
        .map_err(Error::from)
}

/// Retrieve all of the accounts owned by `user_id`, ordered alphabetically by name.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, color FROM account
             WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC",
        )?
        .query_map((user_id,), map_account_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Delete the account `id` owned by `user_id`.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if the account does not exist or belongs to another user,
/// - [Error::AccountInUse] if transactions still refer to the account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_account(user_id: UserID, id: AccountId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    get_account(user_id, id, &transaction)?;

    let in_use: bool = transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE account_id = ?1)",
        (id,),
        |row| row.get(0),
    )?;
    if in_use {
        return Err(Error::AccountInUse);
    }

    transaction
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
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
            ) => Error::AccountInUse,
            error => error.into(),
        })?;

    transaction.commit()?;

    Ok(())
}

pub fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: Some(UserID::new(row.get(1)?)),
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;
    use uuid::Uuid;

    use crate::{
        Error,
        account::{create_account, delete_account, get_account, get_accounts},
        label::{Color, Name},
        test_utils::{TestLedger, get_test_connection},
    };

    #[test]
    fn create_account_succeeds() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        let account = create_account(
            ledger.user_id,
            Name::new("Savings", "account").unwrap(),
            Color::new("#0ea5e9").unwrap(),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_account(ledger.user_id, account.id, &connection),
            Ok(account)
        );
    }

    #[test]
    fn duplicate_name_fails_in_any_case() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        let result = create_account(
            ledger.user_id,
            Name::new("cASH", "account").unwrap(),
            Color::neutral(),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateAccountName("cASH".to_owned())));
    }

    #[test]
    fn other_users_can_reuse_names() {
        let connection = get_test_connection();
        TestLedger::new(&connection);

        // Registration creates "Cash" for the second user as well.
        let other = TestLedger::with_email("other@example.com", &connection);

        assert_eq!(
            get_account(other.user_id, other.cash, &connection)
                .unwrap()
                .name
                .as_ref(),
            "Cash"
        );
    }

    #[test]
    fn get_accounts_only_returns_own_accounts() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        TestLedger::with_email("other@example.com", &connection);

        let accounts = get_accounts(ledger.user_id, &connection).unwrap();

        let ids: Vec<Uuid> = accounts.iter().map(|account| account.id).collect();
        assert_eq!(ids, vec![ledger.card, ledger.cash]);
    }

    #[test]
    fn cannot_delete_account_in_use() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        ledger.expense(dec!(1), date!(2024 - 01 - 05), &connection);

        assert_eq!(
            delete_account(ledger.user_id, ledger.cash, &connection),
            Err(Error::AccountInUse)
        );
        assert!(get_account(ledger.user_id, ledger.cash, &connection).is_ok());
        // The failed delete must not leave a transaction open.
        delete_account(ledger.user_id, ledger.card, &connection).unwrap();
    }

    #[test]
    fn delete_unused_account_succeeds() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        delete_account(ledger.user_id, ledger.card, &connection).unwrap();

        assert_eq!(
            get_account(ledger.user_id, ledger.card, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn cannot_delete_other_users_account() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);

        assert_eq!(
            delete_account(ledger.user_id, other.card, &connection),
            Err(Error::NotFound)
        );
    }
}
