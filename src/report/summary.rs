//! Headline figures for a period: money in, money out and the difference.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error, TransactionType,
    report::{add_money, derive_net},
    transaction::Transaction,
};

/// The key figures over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of all income, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// The sum of all expenses, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Decimal,
    /// The number of transactions the figures were computed from.
    pub transaction_count: usize,
}

/// Summarise `transactions`.
///
/// Filtering by date and type is the caller's job.
///
/// # Errors
/// Returns an [Error::AmountOverflow] if a total cannot be represented.
pub fn summarize(transactions: &[Transaction]) -> Result<Summary, Error> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => income = add_money(income, transaction.amount)?,
            TransactionType::Expense => expense = add_money(expense, transaction.amount)?,
        }
    }

    let (total_income, total_expense, net) = derive_net(income, expense);

    Ok(Summary {
        total_income,
        total_expense,
        net,
        transaction_count: transactions.len(),
    })
}
