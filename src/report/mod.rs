//! Reports derived from a user's ledger.
//!
//! This module contains:
//! - Pure aggregation over transactions: summary figures, a breakdown by
//!   category and a monthly cash-flow series
//! - The rounding rules every report shares
//! - Route handlers that turn query parameters into reports
//!
//! Nothing here writes to the database and nothing is cached: every report is
//! recomputed from the ledger on each request.

mod cash_flow;
mod category_breakdown;
mod handlers;
mod rounding;
mod summary;

pub use cash_flow::{CashFlowWindow, YearMonth, cash_flow, parse_month_count};
pub use category_breakdown::break_down_by_category;
pub use handlers::{get_cash_flow_report, get_category_report, get_summary_report};
pub use rounding::{add_money, derive_net, round_money, round_percentage};
pub use summary::summarize;

#[cfg(test)]
pub(crate) fn test_transaction(
    amount: rust_decimal::Decimal,
    transaction_type: crate::TransactionType,
    date: time::Date,
) -> crate::transaction::Transaction {
    crate::transaction::Transaction {
        id: uuid::Uuid::new_v4(),
        user_id: None,
        amount,
        transaction_type,
        date,
        category_id: uuid::Uuid::new_v4(),
        account_id: uuid::Uuid::new_v4(),
        note: None,
        tags: Vec::new(),
    }
}
