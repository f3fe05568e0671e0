//! Storage layer for nomad day tracking.
//!
//! Persists country tracking records and their stays using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can move between threads but cannot be shared without a `Mutex`.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with a fixed nine-digit
//! fraction (e.g., `2024-01-15T10:30:00.000000000Z`), always UTC, so
//! lexicographic order matches chronological order.
//!
//! ## Derived values
//!
//! Day counts are never stored. Only the inputs (limit, policy, stays) live in
//! the database; counts are recomputed from them on demand.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use nd_core::{
    CountingPolicy, CountryCode, CountryTrackingRecord, DayLimit, RecordStore, StayInterval,
    TrackingError, TrackingPurpose,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {country}: {timestamp}")]
    TimestampParse {
        country: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored value no longer passes domain validation.
    #[error("invalid stored record for {country}")]
    InvalidRecord {
        country: String,
        #[source]
        source: TrackingError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A `countries` row before validation.
struct CountryRow {
    code: String,
    purpose: String,
    day_limit: i64,
    mode: String,
    partial_day_rule: String,
    count_arrival_day: bool,
    count_departure_day: bool,
    track_travel_days: bool,
}

impl CountryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get(0)?,
            purpose: row.get(1)?,
            day_limit: row.get(2)?,
            mode: row.get(3)?,
            partial_day_rule: row.get(4)?,
            count_arrival_day: row.get(5)?,
            count_departure_day: row.get(6)?,
            track_travel_days: row.get(7)?,
        })
    }
}

const COUNTRY_COLUMNS: &str = "code, purpose, day_limit, mode, partial_day_rule, \
     count_arrival_day, count_departure_day, track_travel_days";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- One row per tracked country.
            -- purpose/mode/partial_day_rule: lowercase labels (e.g. 'tax-residence', 'nights')
            CREATE TABLE IF NOT EXISTS countries (
                code TEXT PRIMARY KEY,
                purpose TEXT NOT NULL,
                day_limit INTEGER NOT NULL CHECK (day_limit > 0),
                mode TEXT NOT NULL,
                partial_day_rule TEXT NOT NULL,
                count_arrival_day INTEGER NOT NULL,
                count_departure_day INTEGER NOT NULL,
                track_travel_days INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Stays: entry/exit in RFC 3339 UTC; exit_at NULL while still present.
            CREATE TABLE IF NOT EXISTS stays (
                id TEXT PRIMARY KEY,
                country_code TEXT NOT NULL,
                entry_at TEXT NOT NULL,
                exit_at TEXT,
                FOREIGN KEY (country_code) REFERENCES countries(code) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_stays_country ON stays(country_code);
            CREATE INDEX IF NOT EXISTS idx_stays_entry ON stays(entry_at);
            ",
        )?;
        Ok(())
    }

    /// Loads one record with its stays.
    pub fn load_record(&self, code: &CountryCode) -> Result<Option<CountryTrackingRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE code = ?"),
                [code.as_str()],
                CountryRow::from_row,
            )
            .optional()?;
        row.map(|row| self.assemble(row)).transpose()
    }

    /// Lists all records ordered by country code.
    pub fn list_records(&self) -> Result<Vec<CountryTrackingRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COUNTRY_COLUMNS} FROM countries ORDER BY code ASC"))?;
        let rows = stmt.query_map([], CountryRow::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(self.assemble(row?)?);
        }
        Ok(records)
    }

    /// Inserts or replaces a record and all of its stays.
    ///
    /// The stay set is rewritten wholesale; the record is the source of truth.
    pub fn save_record(&mut self, record: &CountryTrackingRecord) -> Result<(), DbError> {
        let now = format_timestamp(Utc::now());
        let code = record.country_code().as_str();
        let policy = record.policy();

        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO countries
            (code, purpose, day_limit, mode, partial_day_rule, count_arrival_day,
             count_departure_day, track_travel_days, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT(code) DO UPDATE SET
                purpose = excluded.purpose,
                day_limit = excluded.day_limit,
                mode = excluded.mode,
                partial_day_rule = excluded.partial_day_rule,
                count_arrival_day = excluded.count_arrival_day,
                count_departure_day = excluded.count_departure_day,
                track_travel_days = excluded.track_travel_days,
                updated_at = excluded.updated_at
            ",
            params![
                code,
                record.purpose().as_str(),
                i64::from(record.day_limit().days()),
                policy.mode.as_str(),
                policy.partial_day_rule.as_str(),
                policy.count_arrival_day,
                policy.count_departure_day,
                record.track_travel_days(),
                now,
            ],
        )?;
        tx.execute("DELETE FROM stays WHERE country_code = ?", [code])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO stays (id, country_code, entry_at, exit_at) VALUES (?, ?, ?, ?)",
            )?;
            for interval in record.intervals() {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    code,
                    format_timestamp(interval.entry()),
                    interval.exit().map(format_timestamp),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(country = code, stays = record.intervals().len(), "saved record");
        Ok(())
    }

    /// Deletes a record; its stays go with it.
    pub fn delete_record(&mut self, code: &CountryCode) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM countries WHERE code = ?", [code.as_str()])?;
        tracing::debug!(country = %code, deleted, "deleted record");
        Ok(deleted > 0)
    }

    /// Number of stored stays across all countries.
    pub fn count_stays(&self) -> Result<i64, DbError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM stays", [], |row| row.get(0))?)
    }

    fn assemble(&self, row: CountryRow) -> Result<CountryTrackingRecord, DbError> {
        let invalid = |source| DbError::InvalidRecord {
            country: row.code.clone(),
            source,
        };

        let code = CountryCode::new(row.code.as_str()).map_err(invalid)?;
        let purpose: TrackingPurpose = row.purpose.parse().map_err(invalid)?;
        let day_limit = DayLimit::new(row.day_limit).map_err(invalid)?;
        let policy = CountingPolicy::parse(
            &row.mode,
            &row.partial_day_rule,
            row.count_arrival_day,
            row.count_departure_day,
        )
        .map_err(invalid)?;
        let intervals = self.load_stays(&row.code)?;

        Ok(CountryTrackingRecord::from_parts(
            code,
            purpose,
            day_limit,
            policy,
            intervals,
            row.track_travel_days,
        ))
    }

    fn load_stays(&self, country: &str) -> Result<Vec<StayInterval>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT entry_at, exit_at FROM stays
            WHERE country_code = ?
            ORDER BY entry_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([country], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut stays = Vec::new();
        for row in rows {
            let (entry, exit) = row?;
            let entry = parse_timestamp(country, &entry)?;
            let exit = exit
                .map(|exit| parse_timestamp(country, &exit))
                .transpose()?;
            let stay = StayInterval::new(entry, exit).map_err(|source| DbError::InvalidRecord {
                country: country.to_string(),
                source,
            })?;
            stays.push(stay);
        }
        Ok(stays)
    }
}

impl RecordStore for Database {
    type Error = DbError;

    fn load(&self, code: &CountryCode) -> Result<Option<CountryTrackingRecord>, Self::Error> {
        self.load_record(code)
    }

    fn save(&mut self, record: &CountryTrackingRecord) -> Result<(), Self::Error> {
        self.save_record(record)
    }

    fn delete(&mut self, code: &CountryCode) -> Result<bool, Self::Error> {
        self.delete_record(code)
    }

    fn list(&self) -> Result<Vec<CountryTrackingRecord>, Self::Error> {
        self.list_records()
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(country: &str, value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            country: country.to_string(),
            timestamp: value.to_string(),
            source,
        })
}
