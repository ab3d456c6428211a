//! SQLite-backed position store.
//!
//! Every value reaches SQLite as a bound parameter. The table name is the
//! only text spliced into statements and is checked to be a plain identifier
//! when the store is opened.
//!
//! Times are stored as fixed-width ISO-8601 text (nanosecond precision), so
//! string order in the `time` indexes equals chronological order.

use super::{CANCEL_CHECK_INTERVAL, LoadOutcome, PositionStore, ScanRequest, TableAdmin};
use crate::compute::validation::validate_table_name;
use crate::error::{Result, SatposError};
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use satpos_types::{PositionRecord, Timestamp};
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

fn encode_time(time: &Timestamp) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn decode_time(text: &str) -> rusqlite::Result<Timestamp> {
    NaiveDateTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PositionRecord> {
    let time: String = row.get(0)?;
    Ok(PositionRecord {
        time: decode_time(&time)?,
        entity_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

fn collect_rows<I>(rows: I, request: &ScanRequest<'_>, out: &mut Vec<PositionRecord>) -> Result<()>
where
    I: Iterator<Item = rusqlite::Result<PositionRecord>>,
{
    for (n, row) in rows.enumerate() {
        if n % CANCEL_CHECK_INTERVAL == 0 {
            request.check_cancelled()?;
        }
        out.push(row?);
    }
    Ok(())
}

/// Position store on a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P, table_name: &str) -> Result<Self> {
        validate_table_name(table_name)?;
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            SatposError::StoreUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        log::debug!("opened sqlite store {}", path.display());
        Ok(Self::with_connection(conn, table_name))
    }

    pub fn open_in_memory(table_name: &str) -> Result<Self> {
        validate_table_name(table_name)?;
        let conn = Connection::open_in_memory()
            .map_err(|e| SatposError::StoreUnavailable(e.to_string()))?;
        Ok(Self::with_connection(conn, table_name))
    }

    fn with_connection(conn: Connection, table_name: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            table: table_name.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl PositionStore for SqliteStore {
    fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn scan(&self, request: &ScanRequest<'_>) -> Result<Vec<PositionRecord>> {
        request.check_cancelled()?;

        let conn = self.conn.lock();
        let cutoff = encode_time(&request.at_or_before);

        let mut out = Vec::new();
        match request.entity_id {
            Some(entity_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT time, satellite_id, latitude, longitude FROM {} \
                     WHERE satellite_id = ?1 AND time <= ?2",
                    self.table
                ))?;
                let rows = stmt.query_map(params![entity_id, cutoff], map_row)?;
                collect_rows(rows, request, &mut out)?;
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT time, satellite_id, latitude, longitude FROM {} WHERE time <= ?1",
                    self.table
                ))?;
                let rows = stmt.query_map(params![cutoff], map_row)?;
                collect_rows(rows, request, &mut out)?;
            }
        }

        Ok(out)
    }
}

impl TableAdmin for SqliteStore {
    fn setup(&self) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        if Self::table_exists(&tx, &self.table)? {
            return Ok(false);
        }

        tx.execute_batch(&format!(
            "CREATE TABLE {t} (
                 time TEXT NOT NULL,
                 satellite_id TEXT,
                 latitude REAL,
                 longitude REAL
             );
             CREATE INDEX {t}_time_idx ON {t} (time);
             CREATE INDEX {t}_satellite_time_idx ON {t} (satellite_id, time);",
            t = self.table
        ))?;
        tx.commit()?;

        log::info!("created table {}", self.table);
        Ok(true)
    }

    fn teardown(&self) -> Result<bool> {
        let conn = self.conn.lock();
        if !Self::table_exists(&conn, &self.table)? {
            return Ok(false);
        }
        conn.execute_batch(&format!("DROP TABLE {}", self.table))?;
        log::info!("dropped table {}", self.table);
        Ok(true)
    }

    fn load(&self, records: Vec<PositionRecord>) -> Result<LoadOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(LoadOutcome::Skipped {
                existing: existing as u64,
            });
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (time, satellite_id, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
                self.table
            ))?;
            for record in &records {
                stmt.execute(params![
                    encode_time(&record.time),
                    record.entity_id,
                    record.latitude,
                    record.longitude
                ])?;
            }
        }
        tx.commit()?;

        Ok(LoadOutcome::Loaded(records.len()))
    }
}
