//! SQLite-backed visit and prediction logs
//!
//! A single connection sits behind a mutex, so every read and write is
//! serialised and each `record_*` call commits its own transaction.

use crate::store::{PageVisit, PredictionRecord, Store};
use chrono::DateTime;
use emolens_core::time::to_ist;
use emolens_core::{EmotionCategory, Error, Result, Timestamp};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS page_visits (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    page_name   TEXT NOT NULL,
    visited_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS predictions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    raw_text         TEXT NOT NULL,
    predicted_label  TEXT NOT NULL,
    confidence       REAL NOT NULL,
    predicted_at     TEXT NOT NULL
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(storage_err)?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(storage_err)?;

        match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        }) {
            Ok(mode) if mode.eq_ignore_ascii_case("wal") => {}
            Ok(mode) => warn!("SQLite journal mode is '{mode}', expected WAL"),
            Err(e) => warn!("Failed to enable WAL mode: {e}"),
        }

        info!("Opened log database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory database, mostly for tests and one-shot runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Open and initialise the schema in one step
    pub fn open_and_init(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::open(path)?;
        store.ensure_schema()?;
        Ok(store)
    }

    /// Database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Store for SqliteStore {
    fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.conn.lock();

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(storage_err)?;
        if version > SCHEMA_VERSION {
            return Err(Error::storage(format!(
                "database schema version {version} is newer than supported ({SCHEMA_VERSION})"
            )));
        }

        let tx = conn.transaction().map_err(storage_err)?;
        tx.execute_batch(SCHEMA_V1).map_err(storage_err)?;
        if version < SCHEMA_VERSION {
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(storage_err)?;
            debug!("Log schema migrated from version {version} to {SCHEMA_VERSION}");
        }
        tx.commit().map_err(storage_err)
    }

    fn record_visit(&self, page_name: &str, visited_at: Timestamp) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(storage_err)?;
        tx.execute(
            "INSERT INTO page_visits (page_name, visited_at) VALUES (?1, ?2)",
            params![page_name, visited_at.to_rfc3339()],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)
    }

    fn record_prediction(
        &self,
        raw_text: &str,
        label: EmotionCategory,
        confidence: f64,
        predicted_at: Timestamp,
    ) -> Result<()> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(Error::validation(format!(
                "confidence {confidence} is outside [0, 1]"
            )));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(storage_err)?;
        tx.execute(
            "INSERT INTO predictions (raw_text, predicted_label, confidence, predicted_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![raw_text, label.as_str(), confidence, predicted_at.to_rfc3339()],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)
    }

    fn list_visits(&self) -> Result<Vec<PageVisit>> {
        let rows: Vec<(String, String)> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare("SELECT page_name, visited_at FROM page_visits ORDER BY id ASC")
                .map_err(storage_err)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(storage_err)?;
            rows.collect::<rusqlite::Result<_>>().map_err(storage_err)?
        };

        rows.into_iter()
            .map(|(page_name, visited_at)| {
                Ok(PageVisit {
                    page_name,
                    visited_at: parse_timestamp(&visited_at, "visited_at")?,
                })
            })
            .collect()
    }

    fn list_predictions(&self) -> Result<Vec<PredictionRecord>> {
        let rows: Vec<(String, String, f64, String)> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(
                    "SELECT raw_text, predicted_label, confidence, predicted_at
                     FROM predictions ORDER BY id ASC",
                )
                .map_err(storage_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .map_err(storage_err)?;
            rows.collect::<rusqlite::Result<_>>().map_err(storage_err)?
        };

        rows.into_iter()
            .map(|(raw_text, label, confidence, predicted_at)| {
                let predicted_label = label.parse::<EmotionCategory>().map_err(|_| {
                    Error::storage(format!("unknown label '{label}' in prediction log"))
                })?;
                Ok(PredictionRecord {
                    raw_text,
                    predicted_label,
                    confidence,
                    predicted_at: parse_timestamp(&predicted_at, "predicted_at")?,
                })
            })
            .collect()
    }
}

/// Rows written with any other offset are read back in IST
fn parse_timestamp(value: &str, field: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| to_ist(&ts))
        .map_err(|e| Error::storage(format!("invalid {field} '{value}': {e}")))
}

fn storage_err(e: rusqlite::Error) -> Error {
    Error::storage(e.to_string())
}
