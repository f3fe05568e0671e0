//! Status command: day counts against limits for every tracked country.

use std::io::Write;

use anyhow::Result;
use nd_core::{Clock, RecordStore, Snapshot, Tracker, Window};

use super::util::usage_bar;
use crate::cli::WindowArgs;

/// Resolves window flags to a window; `None` means per-country defaults.
pub fn resolve_window(args: &WindowArgs, clock: &impl Clock) -> Option<Window> {
    if args.all_time {
        Some(Window::AllTime)
    } else if let Some(year) = args.year {
        Some(Window::calendar_year(year))
    } else {
        args.rolling
            .map(|days| Window::rolling(days, clock.today()))
    }
}

pub fn run<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    window: Option<Window>,
    json: bool,
) -> Result<()> {
    let snapshots = tracker.snapshot_all(window)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&snapshots)?)?;
        return Ok(());
    }

    if snapshots.is_empty() {
        writeln!(writer, "No countries tracked. Add one with `nd add <COUNTRY>`.")?;
        return Ok(());
    }

    writeln!(writer, "Travel day status as of {}", tracker.clock().today())?;
    writeln!(writer)?;
    for snapshot in &snapshots {
        writeln!(writer, "{}", format_snapshot(snapshot))?;
    }
    Ok(())
}

fn format_snapshot(snapshot: &Snapshot) -> String {
    format!(
        "{code:<4}{count:>6} / {limit:<4} days  {remaining:>6} left  {bar}  {status:<9} ({window})",
        code = snapshot.country_code.as_str(),
        count = snapshot.day_count.to_string(),
        limit = snapshot.day_limit.to_string(),
        remaining = snapshot.remaining.to_string(),
        bar = usage_bar(snapshot.used_fraction),
        status = snapshot.status.as_str(),
        window = snapshot.window,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;
    use nd_core::{CountryCode, FixedClock, MemoryStore, TrackingPurpose};

    fn tracker() -> Tracker<MemoryStore, FixedClock> {
        let mut tracker = Tracker::new(
            MemoryStore::new(),
            FixedClock(Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()),
        );
        let pt = CountryCode::new("PT").unwrap();
        let es = CountryCode::new("ES").unwrap();
        tracker
            .add_country(pt.clone(), TrackingPurpose::TaxResidence, None)
            .unwrap();
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
            .log_entry(&pt, Some(Utc.with_ymd_and_hms(2025, 3, 18, 20, 0, 0).unwrap()))
            .unwrap();
        tracker
    }

    #[test]
    fn status_lists_most_severe_first() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), None, false).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Travel day status as of 2025-04-10

        ES      77 / 90   days      13 left  █████████░  warning   (180 days to 2025-04-10)
        PT      24 / 183  days     159 left  █░░░░░░░░░  safe      (calendar year 2025)
        ");
    }

    #[test]
    fn status_reports_empty_tracker() {
        let tracker = Tracker::new(
            MemoryStore::new(),
            FixedClock(Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()),
        );
        let mut output = Vec::new();
        run(&mut output, &tracker, None, false).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No countries tracked. Add one with `nd add <COUNTRY>`.\n"
        );
    }

    #[test]
    fn status_json_contains_snapshots() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), Some(Window::AllTime), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let snapshots = value.as_array().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0]["countryCode"], "ES");
        assert_eq!(snapshots[0]["dayCount"], 77);
        assert_eq!(snapshots[0]["status"], "warning");
        assert_eq!(snapshots[1]["window"]["kind"], "all-time");
    }

    #[test]
    fn window_flags_resolve() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap());
        let args = WindowArgs {
            rolling: Some(30),
            ..WindowArgs::default()
        };
        assert_eq!(
            resolve_window(&args, &clock),
            Some(Window::rolling(30, clock.today()))
        );
        assert_eq!(resolve_window(&WindowArgs::default(), &clock), None);
    }
}
