//! Rounding and summing rules shared by every report.
//!
//! Money is rounded to cents and percentages to one decimal place, both with
//! halves rounded away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::Error;

/// Add `amount` to a running `total`.
///
/// # Errors
/// Returns an [Error::AmountOverflow] if the sum does not fit in a [Decimal].
/// Validated amounts cannot get there, so this only fails on rows written
/// around the API.
pub fn add_money(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total.checked_add(amount).ok_or_else(|| {
        tracing::error!("Adding {amount} to {total} overflowed");
        Error::AmountOverflow
    })
}

/// Round a monetary amount to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to one decimal place.
pub fn round_percentage(percentage: Decimal) -> Decimal {
    percentage.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Derive the rounded income, expense and net from raw totals.
///
/// Income and expense are each rounded first and the net is computed from the
/// rounded values and rounded again, so the three figures a client sees always
/// add up.
pub fn derive_net(income: Decimal, expense: Decimal) -> (Decimal, Decimal, Decimal) {
    let income = round_money(income);
    let expense = round_money(expense);

    (income, expense, round_money(income - expense))
}
