//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when constructing domain values.
///
/// These are returned at the point of construction and never clamped away.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// A counting policy option had an unrecognized value.
    #[error("invalid {field}: {value}")]
    Configuration { field: &'static str, value: String },

    /// A stay interval would end before it starts, or was already closed.
    #[error("invalid stay interval: {reason}")]
    InvalidInterval { reason: String },

    /// A day limit was zero, negative, or out of range.
    #[error("day limit must be a positive number of days, got {value}")]
    InvalidLimit { value: i64 },

    /// A country code was not a two-letter ISO 3166-1 code.
    #[error("invalid country code: {value:?} (expected two letters, e.g. \"PT\")")]
    InvalidCountryCode { value: String },
}

impl TrackingError {
    pub(crate) fn configuration(field: &'static str, value: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_interval(reason: impl Into<String>) -> Self {
        Self::InvalidInterval {
            reason: reason.into(),
        }
    }
}

/// A validated ISO 3166-1 alpha-2 country code.
///
/// Codes are two ASCII letters and are stored upper-cased, so `"pt"` and
/// `"PT"` identify the same country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a new country code after validation.
    pub fn new(code: impl Into<String>) -> Result<Self, TrackingError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TrackingError::InvalidCountryCode { value: code });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = TrackingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for CountryCode {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A positive number of days a traveler may spend in a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct DayLimit(u32);

impl DayLimit {
    /// Creates a day limit, rejecting zero, negative, and oversized values.
    pub fn new(days: i64) -> Result<Self, TrackingError> {
        match u32::try_from(days) {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(TrackingError::InvalidLimit { value: days }),
        }
    }

    /// Builds a limit from a known-positive constant.
    pub(crate) const fn from_const(days: u32) -> Self {
        assert!(days > 0, "day limit constants must be positive");
        Self(days)
    }

    /// Returns the limit in whole days.
    #[must_use]
    pub const fn days(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for DayLimit {
    type Error = TrackingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayLimit> for u32 {
    fn from(limit: DayLimit) -> Self {
        limit.0
    }
}

impl fmt::Display for DayLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
