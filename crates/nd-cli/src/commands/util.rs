//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative dates (~1000 years in days).
const MAX_RELATIVE_DAYS: u64 = 1000 * 366;

/// Parse a point in time as an RFC 3339 timestamp, a calendar date, or a
/// relative date.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Date: "2026-01-15" (midnight UTC)
/// - Relative: "today", "yesterday", "3 days ago", "2 weeks ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // "today" means now, not the start of the day.
    if s.trim() == "today" {
        return Ok(now);
    }

    let date = parse_date(s, now.date_naive()).with_context(|| {
        format!("Invalid time: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), a date, or '3 days ago'")
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parse a calendar date as ISO 8601 or relative to `today`.
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => {
            return today
                .pred_opt()
                .context("date out of range");
        }
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DAYS_RE.captures(s) else {
        anyhow::bail!("Invalid date: {s}. Use YYYY-MM-DD, 'today', or relative (e.g., '3 days ago')");
    };

    let n: u64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    let days = match &caps[2] {
        "day" => n,
        "week" => n.saturating_mul(7),
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if days > MAX_RELATIVE_DAYS {
        anyhow::bail!("Relative date too far back: {s}");
    }

    today
        .checked_sub_days(Days::new(days))
        .context("date out of range")
}

/// Generates a 10-character usage bar for `fraction` of a limit.
/// Any non-zero usage below 5% still gets a single block.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn usage_bar(fraction: f64) -> String {
    let filled = if fraction > 0.0 && fraction < 0.05 {
        1
    } else {
        // Over-limit usage fills the bar.
        (fraction.max(0.0) * 10.0).round().min(10.0) as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}
