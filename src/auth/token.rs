//! Defines the token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::UserID;

mod datetime_format {
    //! Serializes a [time::OffsetDateTime] with a fixed width format.
    //!
    //! The default format writes midnight as "0:00:00.0", which the default
    //! parser then rejects because it expects two digit hours.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the token expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date_time
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&value, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Who the cookie belongs to and when it stops being valid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// The authenticated user.
    pub user_id: UserID,

    /// The moment after which the token is rejected.
    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the token has expired at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
