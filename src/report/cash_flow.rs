//! Monthly income and expenses over a run of consecutive calendar months.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::{Date, Month};

use crate::{
    Error, TransactionType,
    date_range::DateRange,
    report::{add_money, derive_net},
    transaction::Transaction,
};

/// The number of months in a series when the client does not ask for a length.
pub const DEFAULT_MONTHS: u32 = 6;
/// The longest series a client can ask for.
pub const MAX_MONTHS: u32 = 120;

/// A calendar month, e.g. January 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month as u8).cmp(&(other.year, other.month as u8))
    }
}

impl YearMonth {
    /// The month that contains `date`.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `offset` months after this one, or before it if `offset` is negative.
    ///
    /// Returns `None` if the result is outside the dates that [Date] supports.
    pub fn shift(self, offset: i32) -> Option<Self> {
        let index = self.year.checked_mul(12)? + i32::from(self.month as u8 - 1);
        let shifted = index.checked_add(offset)?;

        let year = shifted.div_euclid(12);
        let month = Month::try_from(u8::try_from(shifted.rem_euclid(12)).ok()? + 1).ok()?;
        let shifted = Self { year, month };

        // Reject months that cannot be turned into dates.
        shifted.first_day()?;

        Some(shifted)
    }

    /// The first day of the month.
    pub fn first_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    /// The last day of the month.
    pub fn last_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, self.month.length(self.year)).ok()
    }

    /// The range of dates from the first to the last day of the month, inclusive.
    pub fn date_range(self) -> Option<DateRange> {
        Some(DateRange::between(self.first_day()?, self.last_day()?))
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse a month in the form `YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(value.to_owned());

        let (year, month) = value.split_once('-').ok_or_else(invalid)?;

        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !is_digits(year) || !is_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Parse the raw `months` query parameter.
///
/// A missing or empty value gives [DEFAULT_MONTHS].
///
/// # Errors
/// Returns an [Error::InvalidMonthCount] if the value is not a whole number
/// between 1 and [MAX_MONTHS].
pub fn parse_month_count(value: Option<&str>) -> Result<u32, Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_MONTHS),
        Some(value) => value,
    };

    match value.parse::<u32>() {
        Ok(months) if (1..=MAX_MONTHS).contains(&months) => Ok(months),
        _ => Err(Error::InvalidMonthCount {
            value: value.to_owned(),
            max: MAX_MONTHS,
        }),
    }
}

/// The months in a cash-flow series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashFlowWindow {
    start: YearMonth,
    months: u32,
}

impl CashFlowWindow {
    /// A window of `months` months beginning with `start`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidMonth] if the window reaches past the dates that
    /// can be represented.
    pub fn starting_at(start: YearMonth, months: u32) -> Result<Self, Error> {
        let window = Self { start, months };
        window.end()?;

        Ok(window)
    }

    /// A window of `months` months that ends with the month containing `today`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidMonth] if the window reaches past the dates that
    /// can be represented.
    pub fn ending_at(today: Date, months: u32) -> Result<Self, Error> {
        let current = YearMonth::of(today);
        let offset = 1 - i32::try_from(months).map_err(|_| out_of_range(current))?;
        let start = current.shift(offset).ok_or_else(|| out_of_range(current))?;

        Self::starting_at(start, months)
    }

    fn end(&self) -> Result<YearMonth, Error> {
        let offset = i32::try_from(self.months)
            .map_err(|_| out_of_range(self.start))?
            .saturating_sub(1);

        self.start
            .shift(offset)
            .ok_or_else(|| out_of_range(self.start))
    }

    /// The months in the window, oldest first.
    pub fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        (0..self.months).filter_map(|offset| {
            i32::try_from(offset)
                .ok()
                .and_then(|offset| self.start.shift(offset))
        })
    }

    /// The dates covered by the window, from the first day of its first month
    /// to the last day of its last month.
    pub fn date_range(&self) -> Result<DateRange, Error> {
        let first = self
            .start
            .first_day()
            .ok_or_else(|| out_of_range(self.start))?;
        let end = self.end()?;
        let last = end.last_day().ok_or_else(|| out_of_range(end))?;

        Ok(DateRange::between(first, last))
    }
}

fn out_of_range(month: YearMonth) -> Error {
    Error::InvalidMonth(month.to_string())
}

/// The totals for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCashFlow {
    /// The month, serialized as `YYYY-MM`.
    pub month: YearMonth,
    /// Money earned in the month, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// Money spent in the month, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Decimal,
}

/// Bucket `transactions` into the months of `window`.
///
/// There is exactly one bucket per month, in chronological order, and months
/// without transactions have zero totals. Transactions outside the window are ignored.
///
/// # Errors
/// Returns an [Error::InvalidMonth] if a month in the window has no dates, or an
/// [Error::AmountOverflow] if a month's totals cannot be represented.
pub fn cash_flow(
    transactions: &[Transaction],
    window: &CashFlowWindow,
) -> Result<Vec<MonthlyCashFlow>, Error> {
    let mut series = Vec::with_capacity(window.months as usize);

    for month in window.months() {
        let range = month.date_range().ok_or_else(|| out_of_range(month))?;
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;

        for transaction in transactions.iter().filter(|t| range.contains(t.date)) {
            match transaction.transaction_type {
                TransactionType::Income => income = add_money(income, transaction.amount)?,
                TransactionType::Expense => expense = add_money(expense, transaction.amount)?,
            }
        }

        let (income, expense, net) = derive_net(income, expense);

        series.push(MonthlyCashFlow {
            month,
            income,
            expense,
            net,
        });
    }

    Ok(series)
}
