//! Splits spending or earning by category.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    category::Category,
    database_id::CategoryId,
    label::{Color, Name},
    report::{add_money, round_money, round_percentage},
    transaction::Transaction,
};

/// The name shown for transactions whose category cannot be found.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// One category's share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// The category the transactions belong to.
    pub category_id: CategoryId,
    /// The category's name, or "Unknown".
    pub category_name: Name,
    /// The category's color, or a neutral gray.
    pub category_color: Color,
    /// The sum of the category's transactions, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// The category's share of the grand total, between 0 and 100 with one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

/// Per-category totals, largest first, and the grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// The categories that had at least one transaction.
    pub data: Vec<CategoryTotal>,
    /// The sum over all categories, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Group `transactions` by category.
///
/// `categories` is used to look up names and colors. Categories that are not
/// in it are reported as "Unknown" instead of being dropped. Categories with
/// equal totals keep the order in which they first appear in `transactions`.
///
/// # Errors
/// Returns an [Error::AmountOverflow] if a total cannot be represented.
pub fn break_down_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<CategoryBreakdown, Error> {
    let mut totals: Vec<(CategoryId, Decimal)> = Vec::new();
    let mut positions: HashMap<CategoryId, usize> = HashMap::new();

    for transaction in transactions {
        match positions.get(&transaction.category_id) {
            Some(&position) => {
                totals[position].1 = add_money(totals[position].1, transaction.amount)?
            }
            None => {
                positions.insert(transaction.category_id, totals.len());
                totals.push((transaction.category_id, transaction.amount));
            }
        }
    }

    // Stable, so ties stay in first-seen order.
    totals.sort_by(|(_, left), (_, right)| right.cmp(left));

    let grand_total = totals
        .iter()
        .try_fold(Decimal::ZERO, |sum, (_, total)| add_money(sum, *total))?;
    let categories: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let data = totals
        .into_iter()
        .map(|(category_id, total)| {
            let percentage = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                round_percentage(total / grand_total * Decimal::ONE_HUNDRED)
            };

            let (category_name, category_color) = match categories.get(&category_id) {
                Some(category) => (category.name.clone(), category.color.clone()),
                None => (Name::new_unchecked(UNKNOWN_CATEGORY_NAME), Color::neutral()),
            };

            CategoryTotal {
                category_id,
                category_name,
                category_color,
                total: round_money(total),
                percentage,
            }
        })
        .collect();

    Ok(CategoryBreakdown {
        data,
        total: round_money(grand_total),
    })
}
