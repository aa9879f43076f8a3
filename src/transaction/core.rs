//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, ToSql, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, TransactionType,
    account::get_account,
    category::get_category,
    database_id::{AccountId, CategoryId, TransactionId, new_id},
    date_range::DateRange,
    user::UserID,
};

/// The longest note, in characters, that can be attached to a transaction.
pub const MAX_NOTE_LENGTH: usize = 500;

/// The largest amount a single transaction can have: 10^15.
///
/// Sums of every transaction a user could realistically record stay far below [Decimal::MAX].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    #[serde(skip)]
    pub user_id: Option<UserID>,
    /// The amount of money spent or earned in this transaction, never negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The ID of the account the transaction belongs to.
    pub account_id: AccountId,
    /// A free text note about what the transaction was for.
    pub note: Option<String>,
    /// Free text labels attached to the transaction.
    pub tags: Vec<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Decimal,
        transaction_type: TransactionType,
        date: Date,
        category_id: CategoryId,
        account_id: AccountId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            date,
            category_id,
            account_id,
            note: None,
            tags: Vec::new(),
        }
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// The builder is validated when it is written to the database with
/// [create_transaction] or [update_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction.
    ///
    /// Amounts are never negative, the direction of the money is given by
    /// `transaction_type`.
    pub amount: Decimal,

    /// Whether the money was earned or spent.
    ///
    /// Must match the type of the category.
    pub transaction_type: TransactionType,

    /// The date when the transaction occurred.
    pub date: Date,

    /// The category of the transaction, e.g. "Food", "Salary".
    pub category_id: CategoryId,

    /// The account the money moved in or out of, e.g. "Cash".
    pub account_id: AccountId,

    /// An optional note about the transaction.
    pub note: Option<String>,

    /// Free text labels, e.g. "holiday".
    pub tags: Vec<String>,
}

#[cfg(test)]
impl TransactionBuilder {
    /// Set the note for the transaction.
    pub fn note(mut self, note: Option<&str>) -> Self {
        self.note = note.map(str::to_owned);
        self
    }

    /// Set the tags for the transaction.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|&tag| tag.to_owned()).collect();
        self
    }
}

impl TransactionBuilder {
    /// Check the fields that can be validated without the database and
    /// normalise the note and tags.
    ///
    /// Empty notes become `None`. Tags are trimmed, and empty or repeated tags dropped.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] or [Error::NoteTooLong].
    fn validate(mut self) -> Result<Self, Error> {
        if self.amount < Decimal::ZERO
            || self.amount > MAX_AMOUNT
            || self.amount.normalize().scale() > 2
        {
            return Err(Error::InvalidAmount(self.amount));
        }

        self.note = self
            .note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty());

        if let Some(note) = &self.note {
            if note.chars().count() > MAX_NOTE_LENGTH {
                return Err(Error::NoteTooLong(MAX_NOTE_LENGTH));
            }
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();

            if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_owned());
            }
        }
        self.tags = tags;

        Ok(self)
    }
}

/// Filters for selecting a user's transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions dated within this range.
    pub date_range: DateRange,
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions in this account.
    pub account_id: Option<AccountId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, type, date, category_id, account_id, note, tags";

/// Check `builder` and the category and account it refers to.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount] or [Error::NoteTooLong] if a field is invalid,
/// - [Error::InvalidCategory] if the category does not exist or belongs to another user,
/// - [Error::TypeMismatch] if the category's type differs from the transaction's type,
/// - [Error::InvalidAccount] if the account does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
fn validate_builder(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<TransactionBuilder, Error> {
    let builder = builder.validate()?;

    let category = get_category(user_id, builder.category_id, connection).map_err(|error| {
        match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        }
    })?;

    if category.category_type != builder.transaction_type {
        return Err(Error::TypeMismatch {
            transaction_type: builder.transaction_type,
            category_type: category.category_type,
        });
    }

    get_account(user_id, builder.account_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidAccount,
        error => error,
    })?;

    Ok(builder)
}

fn serialize_tags(tags: &[String]) -> Result<String, Error> {
    serde_json::to_string(tags).map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return the errors described in [TransactionBuilder] validation:
/// - [Error::InvalidAmount] or [Error::NoteTooLong] if a field is invalid,
/// - [Error::InvalidCategory] if the category does not exist or belongs to another user,
/// - [Error::TypeMismatch] if the category's type differs from the transaction's type,
/// - [Error::InvalidAccount] if the account does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = validate_builder(user_id, builder, connection)?;
    let tags = serialize_tags(&builder.tags)?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" ({TRANSACTION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_id(),
                user_id,
                builder.amount.to_string(),
                builder.transaction_type,
                builder.date,
                builder.category_id,
                builder.account_id,
                builder.note,
                tags,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace the fields of the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns the same validation errors as [create_transaction], and
/// [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = validate_builder(user_id, builder, connection)?;
    let tags = serialize_tags(&builder.tags)?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET amount = ?1, type = ?2, date = ?3, category_id = ?4, account_id = ?5,
                 note = ?6, tags = ?7
             WHERE id = ?8 AND user_id = ?9
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.amount.to_string(),
                builder.transaction_type,
                builder.date,
                builder.category_id,
                builder.account_id,
                builder.note,
                tags,
                id,
                user_id,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_transaction_row)
        .map_err(Error::from)
}

/// Retrieve the transactions owned by `user_id` that match `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = :user_id");
    let mut params: Vec<(&str, &dyn ToSql)> = vec![(":user_id", &user_id)];

    if let Some(from) = &filter.date_range.from {
        query.push_str(" AND date >= :from");
        params.push((":from", from));
    }

    if let Some(to) = &filter.date_range.to {
        query.push_str(" AND date <= :to");
        params.push((":to", to));
    }

    if let Some(transaction_type) = &filter.transaction_type {
        query.push_str(" AND type = :type");
        params.push((":type", transaction_type));
    }

    if let Some(category_id) = &filter.category_id {
        query.push_str(" AND category_id = :category_id");
        params.push((":category_id", category_id));
    }

    if let Some(account_id) = &filter.account_id {
        query.push_str(" AND account_id = :account_id");
        params.push((":account_id", account_id));
    }

    query.push_str(" ORDER BY date DESC, rowid DESC");

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the transaction table and its indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id BLOB PRIMARY KEY,
            user_id BLOB NOT NULL,
            amount TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            date TEXT NOT NULL,
            category_id BLOB NOT NULL,
            account_id BLOB NOT NULL,
            note TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);",
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// **Note:** the row must contain the columns in the order used by [create_transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_amount: String = row.get(2)?;
    let amount = raw_amount
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error)))?;

    let raw_tags: String = row.get(8)?;
    let tags = serde_json::from_str(&raw_tags)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: Some(UserID::new(row.get(1)?)),
        amount,
        transaction_type: row.get(3)?,
        date: row.get(4)?,
        category_id: row.get(5)?,
        account_id: row.get(6)?,
        note: row.get(7)?,
        tags,
    })
}

#[cfg(test)]
mod validation_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;
    use uuid::Uuid;

    use super::{MAX_AMOUNT, MAX_NOTE_LENGTH};
    use crate::{
        Error, TransactionType,
        transaction::Transaction,
    };

    fn builder(amount: rust_decimal::Decimal) -> super::TransactionBuilder {
        Transaction::build(
            amount,
            TransactionType::Expense,
            date!(2024 - 01 - 05),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(
            builder(dec!(-1.00)).validate(),
            Err(Error::InvalidAmount(dec!(-1.00)))
        );
    }

    #[test]
    fn rejects_fractional_cents() {
        assert_eq!(
            builder(dec!(1.005)).validate(),
            Err(Error::InvalidAmount(dec!(1.005)))
        );
    }

    #[test]
    fn accepts_zero_and_trailing_zeros() {
        assert!(builder(dec!(0)).validate().is_ok());
        assert!(builder(dec!(12.5000)).validate().is_ok());
    }

    #[test]
    fn rejects_amounts_above_limit() {
        assert_eq!(MAX_AMOUNT, dec!(1_000_000_000_000_000));
        assert!(builder(MAX_AMOUNT).validate().is_ok());

        let too_large = MAX_AMOUNT + dec!(0.01);
        assert_eq!(
            builder(too_large).validate(),
            Err(Error::InvalidAmount(too_large))
        );
        assert_eq!(
            builder(rust_decimal::Decimal::MAX).validate(),
            Err(Error::InvalidAmount(rust_decimal::Decimal::MAX))
        );
    }

    #[test]
    fn normalises_note_and_tags() {
        let validated = builder(dec!(10))
            .note(Some("   "))
            .tags(&[" holiday ", "", "holiday", "food"])
            .validate()
            .unwrap();

        assert_eq!(validated.note, None);
        assert_eq!(validated.tags, vec!["holiday", "food"]);
    }

    #[test]
    fn rejects_long_notes() {
        let note = "a".repeat(MAX_NOTE_LENGTH + 1);

        assert_eq!(
            builder(dec!(10)).note(Some(&note)).validate(),
            Err(Error::NoteTooLong(MAX_NOTE_LENGTH))
        );
    }
}

#[cfg(test)]
mod database_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;
    use uuid::Uuid;

    use crate::{
        Error, TransactionType,
        date_range::DateRange,
        test_utils::{TestLedger, get_test_connection},
        transaction::{
            Transaction, TransactionFilter, create_transaction, delete_transaction,
            get_transaction, get_transactions, update_transaction,
        },
    };

    #[test]
    fn create_transaction_succeeds() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        let transaction = create_transaction(
            ledger.user_id,
            Transaction::build(
                dec!(12.30),
                TransactionType::Expense,
                date!(2024 - 01 - 05),
                ledger.food,
                ledger.cash,
            )
            .note(Some("Lunch"))
            .tags(&["work"]),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.amount, dec!(12.30));
        assert_eq!(transaction.note.as_deref(), Some("Lunch"));
        assert_eq!(transaction.tags, vec!["work"]);
        assert_eq!(
            get_transaction(ledger.user_id, transaction.id, &connection),
            Ok(transaction)
        );
    }

    #[test]
    fn create_transaction_fails_on_type_mismatch() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        let result = create_transaction(
            ledger.user_id,
            Transaction::build(
                dec!(100),
                TransactionType::Income,
                date!(2024 - 01 - 05),
                ledger.food,
                ledger.cash,
            ),
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::TypeMismatch {
                transaction_type: TransactionType::Income,
                category_type: TransactionType::Expense,
            })
        );
    }

    #[test]
    fn create_transaction_fails_on_other_users_category() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);

        let result = create_transaction(
            ledger.user_id,
            Transaction::build(
                dec!(1),
                TransactionType::Expense,
                date!(2024 - 01 - 05),
                other.food,
                ledger.cash,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn create_transaction_fails_on_other_users_account() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);

        let result = create_transaction(
            ledger.user_id,
            Transaction::build(
                dec!(1),
                TransactionType::Expense,
                date!(2024 - 01 - 05),
                ledger.food,
                other.cash,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAccount));
    }

    #[test]
    fn get_transaction_fails_for_other_user() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);
        let transaction = ledger.expense(dec!(5), date!(2024 - 01 - 05), &connection);

        assert_eq!(
            get_transaction(other.user_id, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_transactions_applies_filters() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);
        ledger.income(dec!(100), date!(2024 - 01 - 05), &connection);
        let wanted = ledger.expense(dec!(40), date!(2024 - 01 - 20), &connection);
        ledger.expense(dec!(30), date!(2024 - 02 - 10), &connection);
        other.expense(dec!(999), date!(2024 - 01 - 20), &connection);

        let transactions = get_transactions(
            ledger.user_id,
            &TransactionFilter {
                date_range: DateRange::between(date!(2024 - 01 - 01), date!(2024 - 01 - 31)),
                transaction_type: Some(TransactionType::Expense),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(transactions, vec![wanted]);
    }

    #[test]
    fn get_transactions_is_newest_first() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let older = ledger.expense(dec!(1), date!(2024 - 01 - 05), &connection);
        let newer = ledger.expense(dec!(2), date!(2024 - 03 - 05), &connection);

        let transactions =
            get_transactions(ledger.user_id, &TransactionFilter::default(), &connection).unwrap();

        assert_eq!(transactions, vec![newer, older]);
    }

    #[test]
    fn update_transaction_replaces_fields() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let transaction = ledger.expense(dec!(5), date!(2024 - 01 - 05), &connection);

        let updated = update_transaction(
            ledger.user_id,
            transaction.id,
            Transaction::build(
                dec!(2500),
                TransactionType::Income,
                date!(2024 - 01 - 31),
                ledger.salary,
                ledger.card,
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, transaction.id);
        assert_eq!(updated.amount, dec!(2500));
        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(updated.category_id, ledger.salary);
        assert_eq!(updated.account_id, ledger.card);
    }

    #[test]
    fn update_transaction_fails_for_other_user() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let other = TestLedger::with_email("other@example.com", &connection);
        let transaction = ledger.expense(dec!(5), date!(2024 - 01 - 05), &connection);

        let result = update_transaction(
            other.user_id,
            transaction.id,
            Transaction::build(
                dec!(1),
                TransactionType::Expense,
                date!(2024 - 01 - 05),
                other.food,
                other.cash,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_removes_row() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);
        let transaction = ledger.expense(dec!(5), date!(2024 - 01 - 05), &connection);

        delete_transaction(ledger.user_id, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(ledger.user_id, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let connection = get_test_connection();
        let ledger = TestLedger::new(&connection);

        assert_eq!(
            delete_transaction(ledger.user_id, Uuid::new_v4(), &connection),
            Err(Error::NotFound)
        );
    }
}
