//! Counting policies: how presence on a calendar day turns into a counted day.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::TrackingError;

/// What unit of presence is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Any presence on a calendar day counts that day.
    Days,
    /// Only presence at midnight counts, attributed to the evening's date.
    Nights,
}

impl CountMode {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Nights => "nights",
        }
    }
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CountMode {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(Self::Days),
            "nights" => Ok(Self::Nights),
            _ => Err(TrackingError::configuration("counting mode", s)),
        }
    }
}

/// How arrival and departure days are weighted in [`CountMode::Days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialDayRule {
    /// A flagged boundary day counts as a whole day.
    Full,
    /// A flagged boundary day counts as half a day.
    Half,
    /// Boundary days never count, whatever the arrival/departure flags say.
    Exclude,
}

impl PartialDayRule {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Exclude => "exclude",
        }
    }

    /// Weight of a boundary day in half-day units.
    pub(crate) const fn boundary_halves(self, flagged: bool) -> u64 {
        match (self, flagged) {
            (Self::Full, true) => 2,
            (Self::Half, true) => 1,
            (Self::Full | Self::Half, false) | (Self::Exclude, _) => 0,
        }
    }
}

impl fmt::Display for PartialDayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PartialDayRule {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "half" => Ok(Self::Half),
            "exclude" => Ok(Self::Exclude),
            _ => Err(TrackingError::configuration("partial-day rule", s)),
        }
    }
}

/// The rules used to convert stays into a day count.
///
/// Any combination of options is accepted. A [`CountMode::Nights`] policy is
/// conventionally paired with [`PartialDayRule::Exclude`] and both flags off
/// (see [`CountingPolicy::nights`]), but nothing enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingPolicy {
    pub mode: CountMode,
    pub partial_day_rule: PartialDayRule,
    pub count_arrival_day: bool,
    pub count_departure_day: bool,
}

impl Default for CountingPolicy {
    fn default() -> Self {
        Self {
            mode: CountMode::Days,
            partial_day_rule: PartialDayRule::Full,
            count_arrival_day: true,
            count_departure_day: true,
        }
    }
}

impl CountingPolicy {
    /// The conventional midnight-presence policy.
    #[must_use]
    pub const fn nights() -> Self {
        Self {
            mode: CountMode::Nights,
            partial_day_rule: PartialDayRule::Exclude,
            count_arrival_day: false,
            count_departure_day: false,
        }
    }

    /// Builds a policy from textual option values, as entered by a user.
    pub fn parse(
        mode: &str,
        partial_day_rule: &str,
        count_arrival_day: bool,
        count_departure_day: bool,
    ) -> Result<Self, TrackingError> {
        Ok(Self {
            mode: mode.parse()?,
            partial_day_rule: partial_day_rule.parse()?,
            count_arrival_day,
            count_departure_day,
        })
    }

    /// Returns a copy with a different counting mode.
    #[must_use]
    pub const fn with_mode(self, mode: CountMode) -> Self {
        Self { mode, ..self }
    }

    /// Returns a copy with a different partial-day rule.
    #[must_use]
    pub const fn with_partial_day_rule(self, partial_day_rule: PartialDayRule) -> Self {
        Self {
            partial_day_rule,
            ..self
        }
    }

    /// Returns a copy with different arrival/departure flags.
    #[must_use]
    pub const fn with_boundary_days(self, arrival: bool, departure: bool) -> Self {
        Self {
            count_arrival_day: arrival,
            count_departure_day: departure,
            ..self
        }
    }

    pub(crate) const fn arrival_halves(&self) -> u64 {
        self.partial_day_rule.boundary_halves(self.count_arrival_day)
    }

    pub(crate) const fn departure_halves(&self) -> u64 {
        self.partial_day_rule
            .boundary_halves(self.count_departure_day)
    }
}

impl fmt::Display for CountingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} boundary days, arrival {}, departure {})",
            self.mode,
            self.partial_day_rule,
            if self.count_arrival_day { "on" } else { "off" },
            if self.count_departure_day { "on" } else { "off" },
        )
    }
}
