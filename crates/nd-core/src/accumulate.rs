//! Day accumulation.
//!
//! Converts a set of stay intervals plus a counting policy into a day count
//! for a reporting window.
//!
//! # Algorithm Summary
//!
//! 1. Resolve the window to an inclusive date range and a reference date
//!    (`as_of` for rolling windows, today otherwise) that closes open stays
//! 2. Clip each stay to the range; stays outside it contribute nothing
//! 3. Weight the days that survive clipping: boundary days by the policy,
//!    everything else as a whole day (or count evenings in nights mode)
//! 4. Sum in half-day units so the result is exact

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::interval::{StayInterval, inclusive_days};
use crate::policy::{CountMode, CountingPolicy};

/// An exact day count with half-day resolution.
///
/// Half days arise from [`PartialDayRule::Half`](crate::PartialDayRule::Half).
/// The count is never rounded; callers pick their own display rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayCount {
    halves: u64,
}

impl DayCount {
    pub const ZERO: Self = Self { halves: 0 };

    /// A count of whole days.
    #[must_use]
    pub const fn from_days(days: u64) -> Self {
        Self {
            halves: days.saturating_mul(2),
        }
    }

    /// A count expressed in half-day units (`5` is two and a half days).
    #[must_use]
    pub const fn from_halves(halves: u64) -> Self {
        Self { halves }
    }

    /// The count in half-day units.
    #[must_use]
    pub const fn halves(self) -> u64 {
        self.halves
    }

    /// Whole days, rounding any trailing half down.
    #[must_use]
    pub const fn whole_days(self) -> u64 {
        self.halves / 2
    }

    #[must_use]
    pub const fn is_whole(self) -> bool {
        self.halves % 2 == 0
    }

    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "day counts stay far below 2^52 half days"
    )]
    pub fn as_f64(self) -> f64 {
        self.halves as f64 / 2.0
    }

    /// Difference, floored at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self {
            halves: self.halves.saturating_sub(other.halves),
        }
    }
}

impl Add for DayCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            halves: self.halves.saturating_add(rhs.halves),
        }
    }
}

impl Sum for DayCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.whole_days())
        } else {
            write!(f, "{}.5", self.whole_days())
        }
    }
}

impl Serialize for DayCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.is_whole() {
            serializer.serialize_u64(self.whole_days())
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

/// The reporting period a count is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Window {
    /// Every recorded stay.
    AllTime,
    /// January 1 through December 31 of the given year.
    CalendarYear { year: i32 },
    /// The `days` calendar dates ending on `as_of`, inclusive.
    RollingDays { days: u32, as_of: NaiveDate },
}

/// An inclusive date range; `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    fn clip(&self, first: NaiveDate, last: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let lo = self.start.map_or(first, |start| start.max(first));
        let hi = self.end.map_or(last, |end| end.min(last));
        (lo <= hi).then_some((lo, hi))
    }
}

impl Window {
    #[must_use]
    pub const fn calendar_year(year: i32) -> Self {
        Self::CalendarYear { year }
    }

    #[must_use]
    pub const fn rolling(days: u32, as_of: NaiveDate) -> Self {
        Self::RollingDays { days, as_of }
    }

    /// The date that closes open stays when counting this window.
    pub const fn reference_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::RollingDays { as_of, .. } => *as_of,
            Self::AllTime | Self::CalendarYear { .. } => today,
        }
    }

    /// Inclusive date range of the window, or `None` when it covers no dates.
    pub(crate) fn range(&self) -> Option<DateRange> {
        match *self {
            Self::AllTime => Some(DateRange {
                start: None,
                end: None,
            }),
            Self::CalendarYear { year } => Some(DateRange {
                start: Some(NaiveDate::from_ymd_opt(year, 1, 1)?),
                end: Some(NaiveDate::from_ymd_opt(year, 12, 31)?),
            }),
            Self::RollingDays { days: 0, .. } => None,
            Self::RollingDays { days, as_of } => {
                let start = as_of
                    .checked_sub_days(Days::new(u64::from(days - 1)))
                    .unwrap_or(NaiveDate::MIN);
                Some(DateRange {
                    start: Some(start),
                    end: Some(as_of),
                })
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTime => write!(f, "all time"),
            Self::CalendarYear { year } => write!(f, "calendar year {year}"),
            Self::RollingDays { days, as_of } => write!(f, "{days} days to {as_of}"),
        }
    }
}

/// Counts the days spent across `intervals` within `window`.
///
/// `today` closes open stays for fixed windows; rolling windows close them
/// at their own `as_of` date. Intervals are assumed not to overlap. An empty
/// slice counts zero.
pub fn accumulate(
    intervals: &[StayInterval],
    policy: &CountingPolicy,
    window: &Window,
    today: NaiveDate,
) -> DayCount {
    let Some(range) = window.range() else {
        return DayCount::ZERO;
    };
    let reference = window.reference_date(today);

    let total = intervals
        .iter()
        .map(|interval| match policy.mode {
            CountMode::Days => count_days(interval, policy, &range, reference),
            CountMode::Nights => count_nights(interval, &range, reference),
        })
        .sum();

    tracing::trace!(
        intervals = intervals.len(),
        mode = %policy.mode,
        %window,
        %total,
        "accumulated days"
    );
    total
}

/// Calendar-day presence, with policy weights on arrival and departure days.
fn count_days(
    interval: &StayInterval,
    policy: &CountingPolicy,
    range: &DateRange,
    reference: NaiveDate,
) -> DayCount {
    let first = interval.entry_date();
    let departure = interval.exit_date();
    let last = departure.unwrap_or(reference);

    let Some((lo, hi)) = range.clip(first, last) else {
        return DayCount::ZERO;
    };

    if departure.is_some() && first == last {
        // Arrived and left on the same date.
        return DayCount::from_halves(policy.arrival_halves().max(policy.departure_halves()));
    }

    let mut halves = inclusive_days(lo, hi) * 2;
    if lo == first {
        halves = halves - 2 + policy.arrival_halves();
    }
    if departure.is_some() && hi == last {
        halves = halves - 2 + policy.departure_halves();
    }
    DayCount::from_halves(halves)
}

/// Midnight presence: one night per evening spent in the country.
fn count_nights(interval: &StayInterval, range: &DateRange, reference: NaiveDate) -> DayCount {
    let first = interval.entry_date();
    let last_evening = match interval.exit_date() {
        Some(exit) => exit.pred_opt(),
        None => Some(reference),
    };
    let Some(last_evening) = last_evening else {
        return DayCount::ZERO;
    };

    range
        .clip(first, last_evening)
        .map_or(DayCount::ZERO, |(lo, hi)| {
            DayCount::from_days(inclusive_days(lo, hi))
        })
}
