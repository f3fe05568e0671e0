//! Country tracking records: the aggregate exposed to callers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accumulate::{DayCount, Window, accumulate};
use crate::clock::Clock;
use crate::compliance::{self, RollingPeak};
use crate::interval::StayInterval;
use crate::policy::CountingPolicy;
use crate::purpose::TrackingPurpose;
use crate::threshold::{Status, evaluate};
use crate::types::{CountryCode, DayLimit, TrackingError};

/// Everything tracked for one country: limit, counting policy, and stays.
///
/// Records are values. Every change returns a new record and leaves the
/// original untouched. Day totals are always derived from the stays and never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryTrackingRecord {
    country_code: CountryCode,
    purpose: TrackingPurpose,
    day_limit: DayLimit,
    policy: CountingPolicy,
    intervals: Vec<StayInterval>,
    /// When false the record is display-only and counts zero days.
    track_travel_days: bool,
}

/// Computed compliance figures for one record and window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub country_code: CountryCode,
    pub window: Window,
    pub day_count: DayCount,
    pub day_limit: DayLimit,
    pub remaining: DayCount,
    pub used_fraction: f64,
    pub status: Status,
}

impl CountryTrackingRecord {
    /// Starts tracking a country with the purpose's default limit and the
    /// default counting policy.
    pub fn new(country_code: CountryCode, purpose: TrackingPurpose) -> Self {
        Self {
            country_code,
            purpose,
            day_limit: purpose.default_limit(),
            policy: CountingPolicy::default(),
            intervals: Vec::new(),
            track_travel_days: true,
        }
    }

    /// Reassembles a record from stored parts.
    pub fn from_parts(
        country_code: CountryCode,
        purpose: TrackingPurpose,
        day_limit: DayLimit,
        policy: CountingPolicy,
        mut intervals: Vec<StayInterval>,
        track_travel_days: bool,
    ) -> Self {
        intervals.sort_by_key(StayInterval::entry);
        Self {
            country_code,
            purpose,
            day_limit,
            policy,
            intervals,
            track_travel_days,
        }
    }

    pub const fn country_code(&self) -> &CountryCode {
        &self.country_code
    }

    pub const fn purpose(&self) -> TrackingPurpose {
        self.purpose
    }

    pub const fn day_limit(&self) -> DayLimit {
        self.day_limit
    }

    pub const fn policy(&self) -> &CountingPolicy {
        &self.policy
    }

    /// Stays ordered by entry time.
    pub fn intervals(&self) -> &[StayInterval] {
        &self.intervals
    }

    pub const fn track_travel_days(&self) -> bool {
        self.track_travel_days
    }

    /// The stay the traveler is currently in, if any.
    pub fn open_interval(&self) -> Option<&StayInterval> {
        self.intervals.iter().rev().find(|interval| interval.is_open())
    }

    /// Returns a record with `interval` added.
    ///
    /// Overlapping stays are not detected; callers keep them disjoint.
    #[must_use]
    pub fn add_interval(&self, interval: StayInterval) -> Self {
        let mut next = self.clone();
        let at = next
            .intervals
            .partition_point(|existing| existing.entry() <= interval.entry());
        next.intervals.insert(at, interval);
        next
    }

    /// Returns a record whose open stay is closed at `exit`.
    pub fn close_open_interval(&self, exit: DateTime<Utc>) -> Result<Self, TrackingError> {
        let Some(index) = self.intervals.iter().rposition(StayInterval::is_open) else {
            return Err(TrackingError::invalid_interval(format!(
                "no open stay in {} to close",
                self.country_code
            )));
        };
        let mut next = self.clone();
        next.intervals[index] = self.intervals[index].close(exit)?;
        Ok(next)
    }

    #[must_use]
    pub fn update_policy(&self, policy: CountingPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Returns a record with a new day limit; zero or negative limits fail.
    pub fn update_limit(&self, new_limit: i64) -> Result<Self, TrackingError> {
        let day_limit = DayLimit::new(new_limit)?;
        Ok(Self {
            day_limit,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn set_tracking(&self, track_travel_days: bool) -> Self {
        Self {
            track_travel_days,
            ..self.clone()
        }
    }

    /// Days counted in `window`; zero when tracking is switched off.
    pub fn day_count(&self, window: &Window, clock: &impl Clock) -> DayCount {
        accumulate(self.counted_intervals(), &self.policy, window, clock.today())
    }

    /// Stays that count toward limits; none when tracking is switched off.
    fn counted_intervals(&self) -> &[StayInterval] {
        if self.track_travel_days {
            &self.intervals
        } else {
            &[]
        }
    }

    /// Highest `window_days` rolling count for any date in `from..=to`.
    pub fn rolling_peak(
        &self,
        window_days: u32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Option<RollingPeak> {
        compliance::peak_rolling_count(self.counted_intervals(), &self.policy, window_days, from, to)
    }

    /// First date in `from..=to` whose rolling count passes the day limit.
    pub fn first_overstay(
        &self,
        window_days: u32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Option<NaiveDate> {
        compliance::first_overstay(
            self.counted_intervals(),
            &self.policy,
            window_days,
            self.day_limit.days(),
            from,
            to,
        )
    }

    /// Day count, remaining allowance, and status for `window`.
    pub fn snapshot(&self, window: Window, clock: &impl Clock) -> Snapshot {
        let day_count = self.day_count(&window, clock);
        let evaluation = evaluate(day_count, self.day_limit);
        Snapshot {
            country_code: self.country_code.clone(),
            window,
            day_count,
            day_limit: self.day_limit,
            remaining: evaluation.remaining,
            used_fraction: evaluation.used_fraction,
            status: evaluation.status,
        }
    }

    /// Snapshot over the purpose's default window.
    pub fn default_snapshot(&self, clock: &impl Clock) -> Snapshot {
        self.snapshot(self.purpose.default_window(clock.today()), clock)
    }

    pub fn yearly_days_spent(&self, year: i32, clock: &impl Clock) -> DayCount {
        self.day_count(&Window::calendar_year(year), clock)
    }

    pub fn total_days_spent(&self, clock: &impl Clock) -> DayCount {
        self.day_count(&Window::AllTime, clock)
    }

    /// Number of recorded entries into the country.
    pub fn total_entries(&self) -> usize {
        self.intervals.len()
    }
}
