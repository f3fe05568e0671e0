//! Why a country is being tracked, and the defaults that follow from it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::accumulate::Window;
use crate::types::{DayLimit, TrackingError};

/// The reason a traveler tracks days in a country.
///
/// Only used to pick a default limit and reporting window; the limit can be
/// changed freely afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingPurpose {
    /// Visa-free or tourist-visa stay.
    #[default]
    Tourist,
    /// Schengen short stay: 90 days in any 180.
    Schengen,
    /// Business visitor allowance.
    Business,
    /// Tax residency threshold (183-day rule).
    TaxResidence,
    /// Work permit or residence permit with a yearly cap.
    WorkPermit,
}

/// How a purpose counts: default limit and the kind of window.
struct PurposeRule {
    purpose: TrackingPurpose,
    label: &'static str,
    limit: DayLimit,
    rolling_days: Option<u32>,
}

static RULES: [PurposeRule; 5] = [
    PurposeRule {
        purpose: TrackingPurpose::Tourist,
        label: "tourist",
        limit: DayLimit::from_const(90),
        rolling_days: None,
    },
    PurposeRule {
        purpose: TrackingPurpose::Schengen,
        label: "schengen",
        limit: DayLimit::from_const(90),
        rolling_days: Some(180),
    },
    PurposeRule {
        purpose: TrackingPurpose::Business,
        label: "business",
        limit: DayLimit::from_const(180),
        rolling_days: None,
    },
    PurposeRule {
        purpose: TrackingPurpose::TaxResidence,
        label: "tax-residence",
        limit: DayLimit::from_const(183),
        rolling_days: None,
    },
    PurposeRule {
        purpose: TrackingPurpose::WorkPermit,
        label: "work-permit",
        limit: DayLimit::from_const(365),
        rolling_days: None,
    },
];

impl TrackingPurpose {
    pub const ALL: [Self; 5] = [
        Self::Tourist,
        Self::Schengen,
        Self::Business,
        Self::TaxResidence,
        Self::WorkPermit,
    ];

    /// RULES is indexed in declaration order.
    fn rule(self) -> &'static PurposeRule {
        &RULES[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.rule().label
    }

    /// Default day limit for this purpose.
    pub fn default_limit(self) -> DayLimit {
        self.rule().limit
    }

    /// Rolling window length, for purposes measured over a sliding period.
    pub fn rolling_days(self) -> Option<u32> {
        self.rule().rolling_days
    }

    /// The window a snapshot uses when the caller doesn't pick one.
    pub fn default_window(self, today: NaiveDate) -> Window {
        self.rolling_days().map_or_else(
            || Window::calendar_year(today.year()),
            |days| Window::rolling(days, today),
        )
    }
}

impl fmt::Display for TrackingPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrackingPurpose {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RULES
            .iter()
            .find(|rule| rule.label == s)
            .map(|rule| rule.purpose)
            .ok_or_else(|| TrackingError::configuration("tracking purpose", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_purpose_has_a_rule() {
        for purpose in TrackingPurpose::ALL {
            assert_eq!(purpose.rule().purpose, purpose);
            assert_eq!(purpose.as_str().parse::<TrackingPurpose>(), Ok(purpose));
        }
    }

    #[test]
    fn default_limits() {
        assert_eq!(TrackingPurpose::Tourist.default_limit().days(), 90);
        assert_eq!(TrackingPurpose::Schengen.default_limit().days(), 90);
        assert_eq!(TrackingPurpose::Business.default_limit().days(), 180);
        assert_eq!(TrackingPurpose::TaxResidence.default_limit().days(), 183);
        assert_eq!(TrackingPurpose::WorkPermit.default_limit().days(), 365);
    }

    #[test]
    fn default_windows() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(
            TrackingPurpose::Schengen.default_window(today),
            Window::rolling(180, today)
        );
        assert_eq!(
            TrackingPurpose::TaxResidence.default_window(today),
            Window::calendar_year(2025)
        );
    }

    #[test]
    fn unknown_purpose_is_configuration_error() {
        assert!(matches!(
            "Tax residence tracking".parse::<TrackingPurpose>(),
            Err(TrackingError::Configuration { .. })
        ));
    }

    #[test]
    fn serde_matches_labels() {
        let json = serde_json::to_string(&TrackingPurpose::TaxResidence).unwrap();
        assert_eq!(json, "\"tax-residence\"");
    }
}
