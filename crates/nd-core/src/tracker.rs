//! Tracking service: record lifecycle on top of a store and a clock.
//!
//! The store and clock are handed in at construction. There is no global
//! instance; callers build one tracker and pass it where it is needed.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::accumulate::Window;
use crate::clock::Clock;
use crate::interval::StayInterval;
use crate::policy::CountingPolicy;
use crate::purpose::TrackingPurpose;
use crate::record::{CountryTrackingRecord, Snapshot};
use crate::store::RecordStore;
use crate::types::{CountryCode, TrackingError};

/// Errors from tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError<E: std::error::Error + 'static> {
    /// The store failed; passed through unmodified.
    #[error("storage error: {0}")]
    Store(#[source] E),

    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error("{0} is not being tracked")]
    UnknownCountry(CountryCode),

    #[error("{0} is already being tracked")]
    AlreadyTracked(CountryCode),

    /// An entry was logged while a stay in the same country is still open.
    #[error("already in {country} since {since}; log an exit first")]
    AlreadyPresent {
        country: CountryCode,
        since: DateTime<Utc>,
    },
}

pub type TrackerResult<T, S> = Result<T, TrackerError<<S as RecordStore>::Error>>;

/// Day tracking for one traveler.
pub struct Tracker<S, C> {
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> Tracker<S, C> {
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Starts tracking a country. `limit` overrides the purpose's default.
    pub fn add_country(
        &mut self,
        code: CountryCode,
        purpose: TrackingPurpose,
        limit: Option<i64>,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        if self.load(&code)?.is_some() {
            return Err(TrackerError::AlreadyTracked(code));
        }
        let mut record = CountryTrackingRecord::new(code, purpose);
        if let Some(limit) = limit {
            record = record.update_limit(limit)?;
        }
        self.save(&record)?;
        tracing::info!(country = %record.country_code(), %purpose, limit = %record.day_limit(), "tracking country");
        Ok(record)
    }

    /// Fetches a tracked country's record.
    pub fn record(&self, code: &CountryCode) -> TrackerResult<CountryTrackingRecord, S> {
        self.load(code)?
            .ok_or_else(|| TrackerError::UnknownCountry(code.clone()))
    }

    /// All tracked records, ordered by country code.
    pub fn records(&self) -> TrackerResult<Vec<CountryTrackingRecord>, S> {
        self.store.list().map_err(TrackerError::Store)
    }

    /// Logs arrival in a country, at `at` or now.
    ///
    /// Any open stay in another country is closed at the same instant.
    pub fn log_entry(
        &mut self,
        code: &CountryCode,
        at: Option<DateTime<Utc>>,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let at = at.unwrap_or_else(|| self.clock.now());
        let record = self.record(code)?;
        if let Some(open) = record.open_interval() {
            return Err(TrackerError::AlreadyPresent {
                country: code.clone(),
                since: open.entry(),
            });
        }

        for other in self.records()? {
            if other.country_code() != code && other.open_interval().is_some() {
                let closed = other.close_open_interval(at)?;
                self.save(&closed)?;
                tracing::info!(country = %other.country_code(), %at, "closed stay on entry elsewhere");
            }
        }

        let record = record.add_interval(StayInterval::open(at));
        self.save(&record)?;
        tracing::info!(country = %code, %at, "logged entry");
        Ok(record)
    }

    /// Logs departure from a country, at `at` or now.
    pub fn log_exit(
        &mut self,
        code: &CountryCode,
        at: Option<DateTime<Utc>>,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let at = at.unwrap_or_else(|| self.clock.now());
        let record = self.record(code)?.close_open_interval(at)?;
        self.save(&record)?;
        tracing::info!(country = %code, %at, "logged exit");
        Ok(record)
    }

    /// Records a completed stay after the fact.
    pub fn add_stay(
        &mut self,
        code: &CountryCode,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let interval = StayInterval::new(entry, Some(exit))?;
        let record = self.record(code)?.add_interval(interval);
        self.save(&record)?;
        tracing::info!(country = %code, %entry, %exit, "added stay");
        Ok(record)
    }

    pub fn update_policy(
        &mut self,
        code: &CountryCode,
        policy: CountingPolicy,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let record = self.record(code)?.update_policy(policy);
        self.save(&record)?;
        tracing::info!(country = %code, %policy, "updated counting policy");
        Ok(record)
    }

    pub fn update_limit(
        &mut self,
        code: &CountryCode,
        new_limit: i64,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let record = self.record(code)?.update_limit(new_limit)?;
        self.save(&record)?;
        tracing::info!(country = %code, limit = new_limit, "updated day limit");
        Ok(record)
    }

    pub fn set_tracking(
        &mut self,
        code: &CountryCode,
        track_travel_days: bool,
    ) -> TrackerResult<CountryTrackingRecord, S> {
        let record = self.record(code)?.set_tracking(track_travel_days);
        self.save(&record)?;
        tracing::info!(country = %code, track_travel_days, "updated tracking toggle");
        Ok(record)
    }

    /// Stops tracking a country and deletes all of its stays.
    pub fn remove_country(&mut self, code: &CountryCode) -> TrackerResult<(), S> {
        let removed = self.store.delete(code).map_err(TrackerError::Store)?;
        if !removed {
            return Err(TrackerError::UnknownCountry(code.clone()));
        }
        tracing::info!(country = %code, "removed country");
        Ok(())
    }

    /// Snapshot for one country; `window` defaults from its purpose.
    pub fn snapshot(
        &self,
        code: &CountryCode,
        window: Option<Window>,
    ) -> TrackerResult<Snapshot, S> {
        let record = self.record(code)?;
        Ok(self.snapshot_record(&record, window))
    }

    /// Snapshots for every tracked country, most severe status first.
    pub fn snapshot_all(&self, window: Option<Window>) -> TrackerResult<Vec<Snapshot>, S> {
        let mut snapshots: Vec<Snapshot> = self
            .records()?
            .iter()
            .map(|record| self.snapshot_record(record, window))
            .collect();
        snapshots.sort_by(|a, b| {
            b.status
                .cmp(&a.status)
                .then_with(|| a.country_code.cmp(&b.country_code))
        });
        Ok(snapshots)
    }

    fn snapshot_record(&self, record: &CountryTrackingRecord, window: Option<Window>) -> Snapshot {
        match window {
            Some(window) => record.snapshot(window, &self.clock),
            None => record.default_snapshot(&self.clock),
        }
    }

    fn load(&self, code: &CountryCode) -> TrackerResult<Option<CountryTrackingRecord>, S> {
        self.store.load(code).map_err(TrackerError::Store)
    }

    fn save(&mut self, record: &CountryTrackingRecord) -> TrackerResult<(), S> {
        self.store.save(record).map_err(TrackerError::Store)
    }
}
