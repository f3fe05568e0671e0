//! Core domain logic for nomad day tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Counting policies and stay intervals
//! - Accumulation: turning stays into exact day counts for a window
//! - Threshold evaluation against visa and tax-residency limits
//! - Country tracking records and the tracker service around them
//! - Rolling-window compliance ("90 days in any 180")

mod accumulate;
pub mod clock;
pub mod compliance;
mod interval;
mod policy;
pub mod purpose;
mod record;
pub mod store;
mod threshold;
pub mod tracker;
pub mod types;

pub use accumulate::{DayCount, Window, accumulate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compliance::{RollingPeak, first_overstay, peak_rolling_count};
pub use interval::StayInterval;
pub use policy::{CountMode, CountingPolicy, PartialDayRule};
pub use purpose::TrackingPurpose;
pub use record::{CountryTrackingRecord, Snapshot};
pub use store::{MemoryStore, RecordStore};
pub use threshold::{Evaluation, Status, evaluate};
pub use tracker::{Tracker, TrackerError, TrackerResult};
pub use types::{CountryCode, DayLimit, TrackingError};
