//! Peak command: worst rolling-window count for one country.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::Days;
use nd_core::{Clock, RecordStore, Tracker};

use super::countries::parse_country;
use super::util::parse_date;

/// Date range and window length for `nd peak`.
#[derive(Debug, Default)]
pub struct PeakOptions<'a> {
    pub window: Option<u32>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

/// Reports the highest rolling count and the first overstay, if any.
///
/// The window length comes from `--window`, then the country's purpose,
/// then `default_window`.
pub fn run<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    country: &str,
    options: &PeakOptions<'_>,
    default_window: u32,
) -> Result<()> {
    let record = tracker.record(&parse_country(country)?)?;
    let today = tracker.clock().today();

    let window_days = options
        .window
        .or_else(|| record.purpose().rolling_days())
        .unwrap_or(default_window);
    if window_days == 0 {
        bail!("Rolling window must be at least one day");
    }

    let to = options
        .to
        .map(|s| parse_date(s, today))
        .transpose()?
        .unwrap_or(today);
    let from = match options.from {
        Some(s) => parse_date(s, today)?,
        None => to
            .checked_sub_days(Days::new(u64::from(window_days - 1)))
            .context("date out of range")?,
    };
    if from > to {
        bail!("--from ({from}) is after --to ({to})");
    }

    let code = record.country_code();
    let limit = record.day_limit();

    let peak = record
        .rolling_peak(window_days, from, to)
        .context("empty date range")?;
    writeln!(
        writer,
        "{code}: peak {} days in a {window_days}-day window, on {} (limit {limit})",
        peak.day_count, peak.date
    )?;

    match record.first_overstay(window_days, from, to) {
        Some(date) => writeln!(writer, "First overstay on {date}")?,
        None => writeln!(writer, "No overstay between {from} and {to}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use nd_core::{CountryCode, FixedClock, MemoryStore, TrackingPurpose};

    fn tracker() -> Tracker<MemoryStore, FixedClock> {
        let mut tracker = Tracker::new(
            MemoryStore::new(),
            FixedClock(Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()),
        );
        let es = CountryCode::new("ES").unwrap();
        tracker
            .add_country(es.clone(), TrackingPurpose::Schengen, None)
            .unwrap();
        tracker
            .add_stay(
                &es,
                Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 18, 18, 0, 0).unwrap(),
            )
            .unwrap();
        tracker
    }

    fn run_peak(tracker: &Tracker<MemoryStore, FixedClock>, options: &PeakOptions<'_>) -> String {
        let mut out = Vec::new();
        run(&mut out, tracker, "ES", options, 180).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn peak_uses_purpose_window_by_default() {
        let output = run_peak(&tracker(), &PeakOptions::default());
        assert_eq!(
            output,
            "ES: peak 77 days in a 180-day window, on 2025-03-18 (limit 90)\n\
             No overstay between 2024-10-13 and 2025-04-10\n"
        );
    }

    #[test]
    fn peak_reports_first_overstay() {
        let mut tracker = tracker();
        tracker
            .update_limit(&CountryCode::new("ES").unwrap(), 60)
            .unwrap();
        let options = PeakOptions {
            window: Some(90),
            ..PeakOptions::default()
        };
        let output = run_peak(&tracker, &options);
        assert_eq!(
            output,
            "ES: peak 77 days in a 90-day window, on 2025-03-18 (limit 60)\n\
             First overstay on 2025-03-02\n"
        );
    }

    #[test]
    fn peak_ignores_untracked_country() {
        let mut tracker = tracker();
        let es = CountryCode::new("ES").unwrap();
        tracker.update_limit(&es, 60).unwrap();
        tracker.set_tracking(&es, false).unwrap();

        let output = run_peak(&tracker, &PeakOptions::default());
        assert_eq!(
            output,
            "ES: peak 0 days in a 180-day window, on 2024-10-13 (limit 60)\n\
             No overstay between 2024-10-13 and 2025-04-10\n"
        );
    }

    #[test]
    fn peak_falls_back_to_configured_window() {
        let mut tracker = tracker();
        let pt = CountryCode::new("PT").unwrap();
        tracker
            .add_country(pt.clone(), TrackingPurpose::Tourist, None)
            .unwrap();
        tracker
            .add_stay(
                &pt,
                Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 18, 18, 0, 0).unwrap(),
            )
            .unwrap();

        let mut out = Vec::new();
        run(&mut out, &tracker, "PT", &PeakOptions::default(), 90).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PT: peak 77 days in a 90-day window, on 2025-03-18 (limit 90)\n\
             No overstay between 2025-01-11 and 2025-04-10\n"
        );
    }

    #[test]
    fn peak_rejects_reversed_range() {
        let options = PeakOptions {
            from: Some("2025-04-01"),
            to: Some("2025-03-01"),
            ..PeakOptions::default()
        };
        let err = run(&mut Vec::new(), &tracker(), "ES", &options, 180).unwrap_err();
        assert!(err.to_string().contains("is after"));
    }

    #[test]
    fn peak_rejects_zero_window() {
        let options = PeakOptions {
            window: Some(0),
            ..PeakOptions::default()
        };
        assert!(run(&mut Vec::new(), &tracker(), "ES", &options, 180).is_err());
    }
}
