//! SQLite reading store implementing the core persistence collaborators.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

use vitalog_core::domain::{Measurement, MeasurementKind, ReadingContext};
use vitalog_core::submit::{ReadingHistory, ReadingSink, SinkError};

pub mod worker;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Plain-row SQLite store for finalized readings. One table, validated on
/// insert (by `Measurement` construction) and again on read, so a corrupted
/// row can never surface as an out-of-range reading.
pub struct ReadingStore {
    conn: Connection,
}

impl ReadingStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // performance pragmas
        conn.pragma_update(None, "journal_mode", &"WAL")?;
        conn.pragma_update(None, "synchronous", &"NORMAL")?;
        let s = ReadingStore { conn };
        s.init_schema()?;
        Ok(s)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let s = ReadingStore { conn };
        s.init_schema()?;
        Ok(s)
    }

    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                value INTEGER NOT NULL,
                unit TEXT NOT NULL,
                context TEXT NOT NULL,
                recorded_at_us INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS readings_kind_ts_idx
                ON readings(kind, recorded_at_us DESC);
            COMMIT;",
        )?;
        Ok(())
    }

    pub fn insert(&self, reading: &Measurement) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO readings (kind, value, unit, context, recorded_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                reading.kind.as_str(),
                reading.value,
                reading.unit,
                reading.context.as_text(),
                reading.recorded_at_us,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent reading of a kind, or None.
    pub fn last(&self, kind: MeasurementKind) -> Result<Option<Measurement>, StoreError> {
        let row: Option<(i64, String, i64)> = self
            .conn
            .query_row(
                "SELECT value, context, recorded_at_us FROM readings
                 WHERE kind = ?1 ORDER BY recorded_at_us DESC, id DESC LIMIT 1",
                params![kind.as_str()],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?;
        row.map(|(value, context, ts)| Self::row_to_measurement(kind, value, &context, ts))
            .transpose()
    }

    /// Most recent readings of a kind, newest first.
    pub fn recent(&self, kind: MeasurementKind, limit: usize) -> Result<Vec<Measurement>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT value, context, recorded_at_us FROM readings
             WHERE kind = ?1 ORDER BY recorded_at_us DESC, id DESC LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![kind.as_str(), limit as i64])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let value: i64 = r.get(0)?;
            let context: String = r.get(1)?;
            let ts: i64 = r.get(2)?;
            out.push(Self::row_to_measurement(kind, value, &context, ts)?);
        }
        Ok(out)
    }

    /// Re-validate on read: a row that no longer satisfies the kind's domain
    /// invariants is an error, never a reading.
    fn row_to_measurement(
        kind: MeasurementKind,
        value: i64,
        context: &str,
        recorded_at_us: i64,
    ) -> Result<Measurement, StoreError> {
        let value =
            i32::try_from(value).map_err(|_| StoreError::InvalidRow(format!("value {value}")))?;
        Measurement::new(kind, value, ReadingContext::from_text(context), recorded_at_us)
            .map_err(|e| StoreError::InvalidRow(e.to_string()))
    }

    /// Force all WAL data into the main DB file.
    pub fn checkpoint_full(&self) -> Result<(), StoreError> {
        self.conn
            .query_row("PRAGMA wal_checkpoint(FULL)", [], |_| Ok(()))?;
        Ok(())
    }
}

impl ReadingSink for ReadingStore {
    fn persist(&self, reading: &Measurement) -> Result<(), SinkError> {
        self.insert(reading)
            .map(|_| ())
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

impl ReadingHistory for ReadingStore {
    fn last_reading(&self, kind: MeasurementKind) -> Result<Option<Measurement>, SinkError> {
        self.last(kind).map_err(|e| match e {
            StoreError::InvalidRow(msg) => SinkError::Rejected(msg),
            other => SinkError::Unavailable(other.to_string()),
        })
    }
}
