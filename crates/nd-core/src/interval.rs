//! Stay intervals: one continuous presence in a country.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TrackingError;

/// One continuous period of physical presence in a country.
///
/// An interval without an exit is *open*: the traveler is still there.
/// Once closed, an interval is never edited; corrections are recorded as a
/// new interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct StayInterval {
    entry: DateTime<Utc>,
    exit: Option<DateTime<Utc>>,
}

/// Unvalidated wire form, so deserialization goes through [`StayInterval::new`].
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInterval {
    entry_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<RawInterval> for StayInterval {
    type Error = TrackingError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.entry_timestamp, raw.exit_timestamp)
    }
}

impl From<StayInterval> for RawInterval {
    fn from(interval: StayInterval) -> Self {
        Self {
            entry_timestamp: interval.entry,
            exit_timestamp: interval.exit,
        }
    }
}

impl StayInterval {
    /// Creates an interval, open when `exit` is `None`.
    pub fn new(entry: DateTime<Utc>, exit: Option<DateTime<Utc>>) -> Result<Self, TrackingError> {
        if let Some(exit) = exit {
            if exit < entry {
                return Err(TrackingError::invalid_interval(format!(
                    "exit {exit} is before entry {entry}"
                )));
            }
        }
        Ok(Self { entry, exit })
    }

    /// Creates an open interval starting at `entry`.
    #[must_use]
    pub const fn open(entry: DateTime<Utc>) -> Self {
        Self { entry, exit: None }
    }

    /// Returns a closed copy of this interval.
    ///
    /// Closing an interval that already has an exit is an error rather than
    /// an overwrite.
    pub fn close(&self, exit: DateTime<Utc>) -> Result<Self, TrackingError> {
        if let Some(existing) = self.exit {
            return Err(TrackingError::invalid_interval(format!(
                "interval entered at {} was already closed at {existing}",
                self.entry
            )));
        }
        Self::new(self.entry, Some(exit))
    }

    pub const fn entry(&self) -> DateTime<Utc> {
        self.entry
    }

    pub const fn exit(&self) -> Option<DateTime<Utc>> {
        self.exit
    }

    pub const fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    /// Calendar date of arrival (UTC).
    pub fn entry_date(&self) -> NaiveDate {
        self.entry.date_naive()
    }

    /// Calendar date of departure (UTC), if the traveler has left.
    pub fn exit_date(&self) -> Option<NaiveDate> {
        self.exit.map(|exit| exit.date_naive())
    }

    /// Last calendar date of presence, treating an open interval as lasting
    /// through `today`.
    pub fn last_date(&self, today: NaiveDate) -> NaiveDate {
        self.exit_date().unwrap_or(today)
    }

    /// Inclusive count of calendar dates from entry to exit (or `today` when
    /// open), ignoring time of day and any counting policy.
    ///
    /// An open interval that starts after `today` spans no days.
    pub fn duration_in_calendar_days(&self, today: NaiveDate) -> u64 {
        let first = self.entry_date();
        let last = self.last_date(today);
        inclusive_days(first, last)
    }
}

/// Number of dates in `first..=last`, zero when the range is empty.
pub(crate) fn inclusive_days(first: NaiveDate, last: NaiveDate) -> u64 {
    u64::try_from((last - first).num_days() + 1).unwrap_or(0)
}
