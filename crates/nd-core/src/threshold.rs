//! Threshold evaluation: how close a day count is to its limit.

use std::fmt;

use serde::Serialize;

use crate::accumulate::DayCount;
use crate::types::DayLimit;

/// Compliance status bands, ordered from least to most severe.
///
/// Lower bounds are inclusive: exactly 80% used is [`Status::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Under 60% of the limit used.
    Safe,
    /// 60% up to 80%.
    Monitor,
    /// 80% up to 90%.
    Warning,
    /// 90% up to 100%.
    Critical,
    /// The limit has been reached or passed.
    Exceeded,
}

/// Band lower bounds in percent, most severe first.
const BANDS: [(u128, Status); 4] = [
    (100, Status::Exceeded),
    (90, Status::Critical),
    (80, Status::Warning),
    (60, Status::Monitor),
];

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Monitor => "monitor",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Exceeded => "exceeded",
        }
    }

    /// Classifies `used` against `limit` with exact integer comparisons.
    fn classify(used: DayCount, limit: DayLimit) -> Self {
        // used / limit >= pct / 100, in half-day units.
        let used = u128::from(used.halves()) * 100;
        let limit_halves = u128::from(limit.days()) * 2;
        BANDS
            .iter()
            .find(|(pct, _)| used >= pct * limit_halves)
            .map_or(Self::Safe, |(_, status)| *status)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of comparing a day count against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Days left before the limit; zero once it is reached.
    pub remaining: DayCount,
    /// `used / limit`; may exceed 1.0.
    pub used_fraction: f64,
    pub status: Status,
}

/// Evaluates `day_count` against `day_limit`.
pub fn evaluate(day_count: DayCount, day_limit: DayLimit) -> Evaluation {
    let limit = DayCount::from_days(u64::from(day_limit.days()));
    Evaluation {
        remaining: limit.saturating_sub(day_count),
        used_fraction: day_count.as_f64() / f64::from(day_limit.days()),
        status: Status::classify(day_count, day_limit),
    }
}
