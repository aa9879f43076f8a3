//! Validated display attributes shared by accounts and categories.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The longest name, in characters, allowed for an account or category.
pub const MAX_NAME_LENGTH: usize = 50;

/// A validated, trimmed, non-empty display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Create a name for a `kind` of thing, e.g. "account".
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyName] if `name` is empty after trimming or an
    /// [Error::NameTooLong] if it has more than [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str, kind: &'static str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName(kind))
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::NameTooLong(kind, MAX_NAME_LENGTH))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a name without validation.
    ///
    /// The caller should ensure that the string is trimmed and not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Name {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for Name {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Name::new_unchecked)
    }
}

/// A hex color, e.g. "#3b82f6", used by clients to draw charts and badges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// The color given to categories that cannot be resolved.
    pub const NEUTRAL: &'static str = "#6b7280";

    /// Create a color from a `#rrggbb` string. Hex digits are lowercased.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidColor] if `color` is not a `#` followed by six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();
        let is_hex_color = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_hex_color {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidColor(color.to_owned()))
        }
    }

    /// Create a color without validation.
    ///
    /// The caller should ensure that the string is a valid `#rrggbb` color.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }

    /// The fallback color for things that have no color of their own.
    pub fn neutral() -> Self {
        Self::new_unchecked(Self::NEUTRAL)
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToSql for Color {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for Color {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Color::new_unchecked)
    }
}
