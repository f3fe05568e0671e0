//! Persistence boundary for tracking records.

use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::record::CountryTrackingRecord;
use crate::types::CountryCode;

/// Load/save access to a traveler's records, keyed by country code.
///
/// Saves are last-writer-wins; deleting a record removes its stays too.
pub trait RecordStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self, code: &CountryCode) -> Result<Option<CountryTrackingRecord>, Self::Error>;

    /// Inserts or replaces the record for its country.
    fn save(&mut self, record: &CountryTrackingRecord) -> Result<(), Self::Error>;

    /// Removes a record and its stays. Returns whether anything was removed.
    fn delete(&mut self, code: &CountryCode) -> Result<bool, Self::Error>;

    /// All records, ordered by country code.
    fn list(&self) -> Result<Vec<CountryTrackingRecord>, Self::Error>;
}

/// An in-process store, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<CountryCode, CountryTrackingRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, code: &CountryCode) -> Result<Option<CountryTrackingRecord>, Self::Error> {
        Ok(self.records.get(code).cloned())
    }

    fn save(&mut self, record: &CountryTrackingRecord) -> Result<(), Self::Error> {
        self.records
            .insert(record.country_code().clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, code: &CountryCode) -> Result<bool, Self::Error> {
        Ok(self.records.remove(code).is_some())
    }

    fn list(&self) -> Result<Vec<CountryTrackingRecord>, Self::Error> {
        Ok(self.records.values().cloned().collect())
    }
}
