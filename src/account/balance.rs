//! Derives account balances from transactions.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    Error, TransactionType,
    database_id::AccountId,
    report::{add_money, round_money},
    transaction::Transaction,
};

/// The balance of an account and the number of transactions it was derived from.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AccountBalance {
    /// Income minus expenses, rounded to cents.
    pub balance: Decimal,
    /// The number of transactions in the account.
    pub transaction_count: usize,
}

#[derive(Default)]
struct RunningTotal {
    income: Decimal,
    expense: Decimal,
    count: usize,
}

impl RunningTotal {
    fn add(&mut self, transaction: &Transaction) -> Result<(), Error> {
        match transaction.transaction_type {
            TransactionType::Income => self.income = add_money(self.income, transaction.amount)?,
            TransactionType::Expense => {
                self.expense = add_money(self.expense, transaction.amount)?
            }
        }
        self.count += 1;

        Ok(())
    }

    fn finish(self) -> AccountBalance {
        AccountBalance {
            balance: round_money(self.income - self.expense),
            transaction_count: self.count,
        }
    }
}

/// Calculate the balance of a single account from its transactions.
///
/// The caller must pass only transactions that belong to the account. An empty
/// slice gives a zero balance.
///
/// # Errors
/// Returns an [Error::AmountOverflow] if the totals cannot be represented.
pub fn calculate_balance(transactions: &[Transaction]) -> Result<AccountBalance, Error> {
    let mut total = RunningTotal::default();

    for transaction in transactions {
        total.add(transaction)?;
    }

    Ok(total.finish())
}

/// Calculate the balance of every account that appears in `transactions` in one pass.
///
/// Accounts without transactions are not in the returned map; use
/// [AccountBalance::default] for them.
///
/// # Errors
/// Returns an [Error::AmountOverflow] if any account's totals cannot be represented.
pub fn calculate_balances(
    transactions: &[Transaction],
) -> Result<HashMap<AccountId, AccountBalance>, Error> {
    let mut totals: HashMap<AccountId, RunningTotal> = HashMap::new();

    for transaction in transactions {
        totals
            .entry(transaction.account_id)
            .or_default()
            .add(transaction)?;
    }

    Ok(totals
        .into_iter()
        .map(|(account_id, total)| (account_id, total.finish()))
        .collect())
}
