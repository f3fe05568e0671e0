//! Report command: stays and totals for a single country.
//!
//! This module implements `nd report <COUNTRY>` with an optional year and
//! output formats (human-readable, JSON).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use nd_core::{
    Clock, CountryTrackingRecord, DayCount, RecordStore, Snapshot, StayInterval, Tracker,
};
use serde::Serialize;

use super::countries::parse_country;

/// Computed report data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub generated_on: NaiveDate,
    pub year: i32,
    pub yearly_days_spent: DayCount,
    pub total_days_spent: DayCount,
    pub total_entries: usize,
    pub snapshot: Snapshot,
    pub record: CountryTrackingRecord,
}

/// Builds report data for one record.
pub fn generate_report_data(
    record: CountryTrackingRecord,
    year: Option<i32>,
    clock: &impl Clock,
) -> ReportData {
    let today = clock.today();
    let year = year.unwrap_or_else(|| today.year());
    ReportData {
        generated_on: today,
        year,
        yearly_days_spent: record.yearly_days_spent(year, clock),
        total_days_spent: record.total_days_spent(clock),
        total_entries: record.total_entries(),
        snapshot: record.default_snapshot(clock),
        record,
    }
}

/// Formats one stay line, e.g. `2025-01-03 -> 2025-02-01  (30 days)`.
fn format_stay(interval: &StayInterval, today: NaiveDate) -> String {
    let exit = interval
        .exit_date()
        .map_or_else(|| "present".to_string(), |date| date.to_string());
    format!(
        "{} -> {exit:<10}  ({} days)",
        interval.entry_date(),
        interval.duration_in_calendar_days(today)
    )
}

/// Formats report data as human-readable text.
pub fn format_report(data: &ReportData) -> String {
    let record = &data.record;
    let snapshot = &data.snapshot;
    let mut out = String::new();

    writeln!(
        out,
        "{} ({}), limit {} days",
        record.country_code(),
        record.purpose(),
        record.day_limit()
    )
    .unwrap();
    writeln!(out, "Policy:   {}", record.policy()).unwrap();
    writeln!(
        out,
        "Tracking: {}",
        if record.track_travel_days() { "on" } else { "off" }
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Days in {}: {}", data.year, data.yearly_days_spent).unwrap();
    writeln!(out, "Days all time: {}", data.total_days_spent).unwrap();
    writeln!(out, "Entries: {}", data.total_entries).unwrap();
    writeln!(
        out,
        "Status ({}): {} used, {} left, {}",
        snapshot.window, snapshot.day_count, snapshot.remaining, snapshot.status
    )
    .unwrap();

    if !record.intervals().is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Stays:").unwrap();
        for interval in record.intervals() {
            writeln!(out, "  {}", format_stay(interval, data.generated_on)).unwrap();
        }
    }
    out
}

pub fn run<W: Write, S: RecordStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    country: &str,
    year: Option<i32>,
    json: bool,
) -> Result<()> {
    let record = tracker.record(&parse_country(country)?)?;
    let data = generate_report_data(record, year, tracker.clock());

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }
    Ok(())
}
