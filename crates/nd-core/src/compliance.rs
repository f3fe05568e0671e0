//! Rolling-window compliance ("90 days in any 180").
//!
//! A rolling rule must hold on every date, not just today. This layer runs
//! the accumulator once per date and reports the worst one.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::accumulate::{DayCount, Window, accumulate};
use crate::interval::StayInterval;
use crate::policy::CountingPolicy;

/// The highest rolling count over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingPeak {
    /// Earliest date whose window reaches the peak.
    pub date: NaiveDate,
    pub day_count: DayCount,
}

/// Finds the largest `window_days` rolling count for any `as_of` date in
/// `from..=to`.
///
/// Open stays are treated as lasting through each evaluated date. Returns
/// `None` when `from` is after `to`.
pub fn peak_rolling_count(
    intervals: &[StayInterval],
    policy: &CountingPolicy,
    window_days: u32,
    from: NaiveDate,
    to: NaiveDate,
) -> Option<RollingPeak> {
    if from > to {
        return None;
    }

    let dates: Vec<NaiveDate> = from.iter_days().take_while(|date| *date <= to).collect();
    let peak = dates
        .par_iter()
        .map(|&date| RollingPeak {
            date,
            day_count: accumulate(intervals, policy, &Window::rolling(window_days, date), date),
        })
        // Highest count wins; ties go to the earlier date.
        .max_by(|a, b| a.day_count.cmp(&b.day_count).then(b.date.cmp(&a.date)))?;

    tracing::debug!(
        window_days,
        dates = dates.len(),
        peak_date = %peak.date,
        peak = %peak.day_count,
        "computed rolling peak"
    );
    Some(peak)
}

/// First date in `from..=to` whose rolling count exceeds `limit_days`.
pub fn first_overstay(
    intervals: &[StayInterval],
    policy: &CountingPolicy,
    window_days: u32,
    limit_days: u32,
    from: NaiveDate,
    to: NaiveDate,
) -> Option<NaiveDate> {
    let limit = DayCount::from_days(u64::from(limit_days));
    from.iter_days().take_while(|date| *date <= to).find(|&date| {
        accumulate(intervals, policy, &Window::rolling(window_days, date), date) > limit
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stay(from: NaiveDate, to: NaiveDate) -> StayInterval {
        let entry = Utc.from_utc_datetime(&from.and_hms_opt(9, 0, 0).unwrap());
        let exit = Utc.from_utc_datetime(&to.and_hms_opt(18, 0, 0).unwrap());
        StayInterval::new(entry, Some(exit)).unwrap()
    }

    #[test]
    fn empty_range_has_no_peak() {
        let peak = peak_rolling_count(
            &[],
            &CountingPolicy::default(),
            180,
            date(2025, 2, 1),
            date(2025, 1, 1),
        );
        assert_eq!(peak, None);
    }

    #[test]
    fn peak_is_found_inside_range_not_at_end() {
        // 60 days early in the year, then gone: the 180-day count peaks at
        // the exit date and decays afterwards.
        let intervals = [stay(date(2025, 1, 1), date(2025, 3, 1))];
        let policy = CountingPolicy::default();

        let peak = peak_rolling_count(&intervals, &policy, 180, date(2025, 1, 1), date(2025, 12, 31))
            .unwrap();
        assert_eq!(peak.day_count, DayCount::from_days(60));
        assert_eq!(peak.date, date(2025, 3, 1));

        let at_end = accumulate(
            &intervals,
            &policy,
            &Window::rolling(180, date(2025, 12, 31)),
            date(2025, 12, 31),
        );
        assert_eq!(at_end, DayCount::ZERO);
    }

    #[test]
    fn two_trips_combine_within_window() {
        // 50 days + 50 days, 30 days apart: both fit in one 180-day window.
        let intervals = [
            stay(date(2025, 1, 1), date(2025, 2, 19)),
            stay(date(2025, 3, 21), date(2025, 5, 9)),
        ];
        let policy = CountingPolicy::default();

        let peak = peak_rolling_count(&intervals, &policy, 180, date(2025, 1, 1), date(2025, 6, 30))
            .unwrap();
        assert_eq!(peak.day_count, DayCount::from_days(100));
        assert_eq!(peak.date, date(2025, 5, 9));

        let overstay = first_overstay(&intervals, &policy, 180, 90, date(2025, 1, 1), date(2025, 6, 30));
        // Day 91 falls on the 41st day of the second trip.
        assert_eq!(overstay, Some(date(2025, 4, 30)));
    }

    #[test]
    fn no_overstay_when_under_limit() {
        let intervals = [stay(date(2025, 1, 1), date(2025, 1, 31))];
        let overstay = first_overstay(
            &intervals,
            &CountingPolicy::default(),
            180,
            90,
            date(2025, 1, 1),
            date(2025, 12, 31),
        );
        assert_eq!(overstay, None);
    }
}
