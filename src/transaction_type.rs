//! The type shared by transactions and categories: money either comes in or goes out.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether money was earned or spent.
///
/// There are no transfers: every transaction and every category is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The string used for this type in the database and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parse an optional filter value from a query string.
    ///
    /// A missing or empty value means no filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] for any other value that is not
    /// exactly "income" or "expense".
    pub fn parse_filter(value: Option<&str>) -> Result<Option<Self>, Error> {
        match value {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, TransactionType};

    #[test]
    fn parses_exact_values() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn rejects_other_values() {
        assert_eq!(
            "Income".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("Income".to_owned()))
        );
        assert_eq!(
            "transfer".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("transfer".to_owned()))
        );
    }

    #[test]
    fn empty_filter_means_no_filter() {
        assert_eq!(TransactionType::parse_filter(None), Ok(None));
        assert_eq!(TransactionType::parse_filter(Some("")), Ok(None));
    }

    #[test]
    fn filter_must_be_a_valid_type() {
        assert_eq!(
            TransactionType::parse_filter(Some("expense")),
            Ok(Some(TransactionType::Expense))
        );
        assert_eq!(
            TransactionType::parse_filter(Some("both")),
            Err(Error::InvalidTransactionType("both".to_owned()))
        );
    }

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Expense).unwrap(),
            "\"expense\""
        );
    }
}
