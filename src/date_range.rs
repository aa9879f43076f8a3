//! Inclusive calendar date ranges and parsing of the dates clients send.

use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

use crate::Error;

/// An optionally bounded, inclusive range of calendar dates.
///
/// Dates have day granularity, so `to` already covers the whole of its day:
/// a transaction dated exactly on `to` is inside the range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range, or `None` for no lower bound.
    pub from: Option<Date>,
    /// The last day in the range, or `None` for no upper bound.
    pub to: Option<Date>,
}

impl DateRange {
    /// A range with no bounds, covering the entire history.
    pub const ALL: Self = Self {
        from: None,
        to: None,
    };

    /// Create a range.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `from` falls after `to`.
    pub fn new(from: Option<Date>, to: Option<Date>) -> Result<Self, Error> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(Error::InvalidDateRange { from, to });
            }
        }

        Ok(Self { from, to })
    }

    /// Create a range from the raw `from` and `to` query parameters.
    ///
    /// Missing or empty values leave that end of the range open.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if either value is not a date, or
    /// [Error::InvalidDateRange] if `from` falls after `to`.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, Error> {
        let from = parse_optional_date(from)?;
        let to = parse_optional_date(to)?;

        Self::new(from, to)
    }

    /// Create a range covering `from` through `to`, both inclusive.
    pub fn between(from: Date, to: Date) -> Self {
        Self {
            from: Some(from.min(to)),
            to: Some(to.max(from)),
        }
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<Date>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

/// Parse an ISO 8601 date such as "2024-01-31".
///
/// A full RFC 3339 date-time such as "2024-01-31T09:30:00Z" is also accepted,
/// in which case the calendar date of that instant is used.
///
/// # Errors
/// Returns [Error::InvalidDate] if `value` is neither.
pub fn parse_date(value: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(value, format)
        .or_else(|_| OffsetDateTime::parse(value, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| Error::InvalidDate(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        date_range::{DateRange, parse_date},
    };

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_date("2024-02-29"), Ok(date!(2024 - 02 - 29)));
    }

    #[test]
    fn parses_date_times() {
        assert_eq!(
            parse_date("2024-01-31T23:59:59.999Z"),
            Ok(date!(2024 - 01 - 31))
        );
    }

    #[test]
    fn rejects_invalid_dates() {
        for value in ["2023-02-29", "31/01/2024", "yesterday", "2024-1-5"] {
            assert_eq!(
                parse_date(value),
                Err(Error::InvalidDate(value.to_owned())),
                "want {value} to be rejected"
            );
        }
    }

    #[test]
    fn empty_values_leave_range_open() {
        assert_eq!(DateRange::parse(Some(""), None), Ok(DateRange::ALL));
    }

    #[test]
    fn rejects_from_after_to() {
        assert_eq!(
            DateRange::parse(Some("2024-02-01"), Some("2024-01-31")),
            Err(Error::InvalidDateRange {
                from: date!(2024 - 02 - 01),
                to: date!(2024 - 01 - 31)
            })
        );
    }

    #[test]
    fn same_day_range_is_valid() {
        let range = DateRange::parse(Some("2024-01-31"), Some("2024-01-31")).unwrap();

        assert!(range.contains(date!(2024 - 01 - 31)));
        assert!(!range.contains(date!(2024 - 02 - 01)));
        assert!(!range.contains(date!(2024 - 01 - 30)));
    }

    #[test]
    fn range_includes_both_ends() {
        let range = DateRange::between(date!(2024 - 01 - 01), date!(2024 - 01 - 31));

        assert!(range.contains(date!(2024 - 01 - 01)));
        assert!(range.contains(date!(2024 - 01 - 31)));
        assert!(!range.contains(date!(2023 - 12 - 31)));
    }

    #[test]
    fn open_range_contains_everything() {
        assert!(DateRange::ALL.contains(date!(1970 - 01 - 01)));
        assert!(DateRange::ALL.contains(date!(2999 - 12 - 31)));
    }
}
