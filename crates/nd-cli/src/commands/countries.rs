//! Commands that change what is tracked: countries, stays, limits, policies.

use std::io::Write;

use anyhow::{Context, Result};
use nd_core::{
    Clock, CountryCode, CountryTrackingRecord, RecordStore, StayInterval, Tracker, TrackingPurpose,
};

use super::util::parse_datetime;

/// Options for `nd policy`; unset fields keep the current value.
#[derive(Debug, Default)]
pub struct PolicyChange<'a> {
    pub mode: Option<&'a str>,
    pub partial: Option<&'a str>,
    pub arrival: Option<bool>,
    pub departure: Option<bool>,
}

pub fn parse_country(country: &str) -> Result<CountryCode> {
    Ok(country.parse::<CountryCode>()?)
}

pub fn add<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    purpose: TrackingPurpose,
    limit: Option<i64>,
) -> Result<()> {
    let record = tracker.add_country(parse_country(country)?, purpose, limit)?;
    writeln!(
        writer,
        "Tracking {} ({}), limit {} days",
        record.country_code(),
        record.purpose(),
        record.day_limit()
    )?;
    Ok(())
}

pub fn enter<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    at: Option<&str>,
) -> Result<()> {
    let code = parse_country(country)?;
    let at = at
        .map(|at| parse_datetime(at, tracker.clock().now()))
        .transpose()?;
    let record = tracker.log_entry(&code, at)?;
    let entry = record
        .open_interval()
        .context("entry was not recorded")?
        .entry();
    writeln!(writer, "Entered {code} at {}", entry.format("%Y-%m-%d %H:%M UTC"))?;
    Ok(())
}

pub fn exit<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    at: Option<&str>,
) -> Result<()> {
    let code = parse_country(country)?;
    let at = at
        .map(|at| parse_datetime(at, tracker.clock().now()))
        .transpose()?;
    let entry = tracker
        .record(&code)?
        .open_interval()
        .map(StayInterval::entry);
    let record = tracker.log_exit(&code, at)?;
    let stay_days = record
        .intervals()
        .iter()
        .find(|interval| Some(interval.entry()) == entry && !interval.is_open())
        .map_or(0, |interval| {
            interval.duration_in_calendar_days(tracker.clock().today())
        });
    writeln!(writer, "Left {code} after {stay_days} calendar days")?;
    Ok(())
}

pub fn stay<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    from: &str,
    to: &str,
) -> Result<()> {
    let code = parse_country(country)?;
    let now = tracker.clock().now();
    let entry = parse_datetime(from, now)?;
    let exit = parse_datetime(to, now)?;
    let record = tracker.add_stay(&code, entry, exit)?;
    writeln!(
        writer,
        "Recorded stay in {code}: {} to {} ({} entries)",
        entry.date_naive(),
        exit.date_naive(),
        record.total_entries()
    )?;
    Ok(())
}

pub fn policy<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    change: &PolicyChange<'_>,
) -> Result<()> {
    let code = parse_country(country)?;
    let current = *tracker.record(&code)?.policy();

    let mut policy = current;
    if let Some(mode) = change.mode {
        policy = policy.with_mode(mode.parse()?);
    }
    if let Some(partial) = change.partial {
        policy = policy.with_partial_day_rule(partial.parse()?);
    }
    policy = policy.with_boundary_days(
        change.arrival.unwrap_or(policy.count_arrival_day),
        change.departure.unwrap_or(policy.count_departure_day),
    );

    let record = tracker.update_policy(&code, policy)?;
    writeln!(writer, "{code} now counts {}", record.policy())?;
    Ok(())
}

pub fn limit<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    days: i64,
) -> Result<()> {
    let code = parse_country(country)?;
    let record = tracker.update_limit(&code, days)?;
    writeln!(writer, "{code} limit set to {} days", record.day_limit())?;
    Ok(())
}

pub fn track<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
    on: bool,
) -> Result<()> {
    let code = parse_country(country)?;
    let record: CountryTrackingRecord = tracker.set_tracking(&code, on)?;
    let state = if record.track_travel_days() {
        "counted"
    } else {
        "not counted"
    };
    writeln!(writer, "Days in {code} are {state}")?;
    Ok(())
}

pub fn remove<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    country: &str,
) -> Result<()> {
    let code = parse_country(country)?;
    tracker.remove_country(&code)?;
    writeln!(writer, "Stopped tracking {code} and deleted its stays")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use nd_core::{CountMode, FixedClock, MemoryStore, PartialDayRule};

    fn tracker() -> Tracker<MemoryStore, FixedClock> {
        Tracker::new(
            MemoryStore::new(),
            FixedClock(Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()),
        )
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn add_then_enter_and_exit() {
        let mut tracker = tracker();
        let mut out = Vec::new();
        add(&mut out, &mut tracker, "pt", TrackingPurpose::TaxResidence, None).unwrap();
        enter(&mut out, &mut tracker, "PT", Some("2025-04-01")).unwrap();
        exit(&mut out, &mut tracker, "PT", None).unwrap();

        assert_eq!(
            output(out),
            "Tracking PT (tax-residence), limit 183 days\n\
             Entered PT at 2025-04-01 00:00 UTC\n\
             Left PT after 10 calendar days\n"
        );
    }

    #[test]
    fn exit_reports_the_stay_just_closed() {
        let mut tracker = tracker();
        add(&mut Vec::new(), &mut tracker, "PT", TrackingPurpose::Tourist, None).unwrap();
        enter(&mut Vec::new(), &mut tracker, "PT", Some("2025-03-01")).unwrap();
        // A back-filled stay that ends after the open one.
        stay(&mut Vec::new(), &mut tracker, "PT", "2025-03-10", "2025-03-30").unwrap();

        let mut out = Vec::new();
        exit(&mut out, &mut tracker, "PT", Some("2025-03-05")).unwrap();
        assert_eq!(output(out), "Left PT after 5 calendar days\n");
    }

    #[test]
    fn invalid_country_code_is_rejected() {
        let mut tracker = tracker();
        let err = add(&mut Vec::new(), &mut tracker, "Portugal", TrackingPurpose::Tourist, None)
            .unwrap_err();
        assert!(err.to_string().contains("invalid country code"));
    }

    #[test]
    fn policy_changes_only_given_fields() {
        let mut tracker = tracker();
        add(&mut Vec::new(), &mut tracker, "ES", TrackingPurpose::Schengen, None).unwrap();

        let change = PolicyChange {
            partial: Some("half"),
            departure: Some(false),
            ..PolicyChange::default()
        };
        policy(&mut Vec::new(), &mut tracker, "ES", &change).unwrap();

        let record = tracker.record(&parse_country("ES").unwrap()).unwrap();
        assert_eq!(record.policy().mode, CountMode::Days);
        assert_eq!(record.policy().partial_day_rule, PartialDayRule::Half);
        assert!(record.policy().count_arrival_day);
        assert!(!record.policy().count_departure_day);
    }

    #[test]
    fn policy_rejects_unknown_mode() {
        let mut tracker = tracker();
        add(&mut Vec::new(), &mut tracker, "ES", TrackingPurpose::Schengen, None).unwrap();
        let change = PolicyChange {
            mode: Some("hours"),
            ..PolicyChange::default()
        };
        let err = policy(&mut Vec::new(), &mut tracker, "ES", &change).unwrap_err();
        assert_eq!(err.to_string(), "invalid counting mode: hours");
    }

    #[test]
    fn limit_rejects_negative() {
        let mut tracker = tracker();
        add(&mut Vec::new(), &mut tracker, "ES", TrackingPurpose::Schengen, None).unwrap();
        let err = limit(&mut Vec::new(), &mut tracker, "ES", -1).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn remove_reports_deletion() {
        let mut tracker = tracker();
        add(&mut Vec::new(), &mut tracker, "ES", TrackingPurpose::Schengen, None).unwrap();
        let mut out = Vec::new();
        remove(&mut out, &mut tracker, "ES").unwrap();
        assert_eq!(output(out), "Stopped tracking ES and deleted its stays\n");
        assert!(tracker.records().unwrap().is_empty());
    }
}
