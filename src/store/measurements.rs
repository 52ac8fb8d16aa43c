//! Measurement store - SQLite wrapper over the ARGO dataset tables
//!
//! Schema mirrors the upstream ingestion layout: floats own profiles,
//! profiles own measurements, measurements carry the scalar parameters
//! (each nullable). Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

/// Temporal and volumetric coverage of the dataset
///
/// Read once at engine initialization and quoted by the greeting and
/// no-data suggestion text.
#[derive(Debug, Clone, Default)]
pub struct DatasetCoverage {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub measurements: i64,
    pub floats: i64,
}

impl DatasetCoverage {
    /// Human-readable date range, e.g. "January 10, 2010 to January 20, 2010"
    pub fn date_range(&self) -> Option<String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(format!(
                "{} to {}",
                start.format("%B %-d, %Y"),
                end.format("%B %-d, %Y")
            )),
            _ => None,
        }
    }
}

/// One joined measurement row sampled for evidence indexing
#[derive(Debug, Clone)]
pub struct SampledMeasurement {
    pub id: i64,
    pub float_id: String,
    pub time: Option<NaiveDateTime>,
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub oxygen: Option<f64>,
    pub ph: Option<f64>,
    pub chlorophyll: Option<f64>,
    pub wmo_id: Option<i64>,
    pub deployment_date: Option<String>,
    pub cycle_number: Option<i64>,
}

/// SQLite store over floats / profiles / measurements
pub struct MeasurementStore {
    conn: Mutex<Connection>,
}

impl MeasurementStore {
    /// Open or create the measurement database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(path.as_ref()).context("Failed to open measurement database")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS floats (
                float_id TEXT PRIMARY KEY,
                wmo_id INTEGER,
                deployment_date TEXT,
                deployment_lat REAL,
                deployment_lon REAL,
                status TEXT DEFAULT 'ACTIVE'
            );
            CREATE TABLE IF NOT EXISTS profiles (
                profile_id INTEGER PRIMARY KEY AUTOINCREMENT,
                float_id TEXT REFERENCES floats(float_id),
                cycle_number INTEGER,
                profile_date TEXT,
                profile_lat REAL,
                profile_lon REAL,
                n_levels INTEGER
            );
            CREATE TABLE IF NOT EXISTS measurements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER REFERENCES profiles(profile_id),
                float_id TEXT REFERENCES floats(float_id),
                time TEXT,
                lat REAL,
                lon REAL,
                depth REAL,
                pressure REAL,
                temperature REAL,
                salinity REAL,
                oxygen REAL,
                ph REAL,
                chlorophyll REAL
            );
            CREATE INDEX IF NOT EXISTS idx_measurements_time ON measurements(time);
            CREATE INDEX IF NOT EXISTS idx_measurements_float ON measurements(float_id);",
        )
        .context("Failed to initialize measurement schema")?;
        Ok(())
    }

    /// Run a read-only closure against the underlying connection
    ///
    /// The executor uses this to run synthesized aggregation SQL; callers
    /// must not mutate through it.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Dataset coverage summary (min/max time, measurement and float counts)
    pub fn coverage(&self) -> Result<DatasetCoverage> {
        let conn = self.conn.lock();
        let (min_time, max_time, measurements): (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(time), MAX(time), COUNT(*) FROM measurements",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("Failed to read dataset coverage")?;
        let floats: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT float_id) FROM measurements",
            [],
            |row| row.get(0),
        )?;

        Ok(DatasetCoverage {
            start: min_time.as_deref().and_then(parse_date),
            end: max_time.as_deref().and_then(parse_date),
            measurements,
            floats,
        })
    }

    /// Sample joined measurement rows for evidence indexing
    ///
    /// Mirrors the ingestion sampling: ordered by time, float, depth,
    /// capped at `limit` rows.
    pub fn sample_measurements(&self, limit: usize) -> Result<Vec<SampledMeasurement>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT m.id, m.float_id, m.time, m.lat, m.lon, m.depth,
                    m.temperature, m.salinity, m.oxygen, m.ph, m.chlorophyll,
                    f.wmo_id, f.deployment_date, p.cycle_number
             FROM measurements m
             JOIN floats f ON m.float_id = f.float_id
             JOIN profiles p ON m.profile_id = p.profile_id
             ORDER BY m.time, m.float_id, m.depth
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let time: Option<String> = row.get(2)?;
                Ok(SampledMeasurement {
                    id: row.get(0)?,
                    float_id: row.get(1)?,
                    time: time.as_deref().and_then(parse_datetime),
                    lat: row.get(3)?,
                    lon: row.get(4)?,
                    depth: row.get(5)?,
                    temperature: row.get(6)?,
                    salinity: row.get(7)?,
                    oxygen: row.get(8)?,
                    ph: row.get(9)?,
                    chlorophyll: row.get(10)?,
                    wmo_id: row.get(11)?,
                    deployment_date: row.get(12)?,
                    cycle_number: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Insert a float record (ingestion/seeding only)
    pub fn insert_float(
        &self,
        float_id: &str,
        wmo_id: i64,
        deployment_date: &str,
        lat: f64,
        lon: f64,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO floats
             (float_id, wmo_id, deployment_date, deployment_lat, deployment_lon)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![float_id, wmo_id, deployment_date, lat, lon],
        )?;
        Ok(())
    }

    /// Insert a profile record, returning its id (ingestion/seeding only)
    pub fn insert_profile(
        &self,
        float_id: &str,
        cycle_number: i64,
        profile_date: &str,
        lat: f64,
        lon: f64,
        n_levels: i64,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO profiles
             (float_id, cycle_number, profile_date, profile_lat, profile_lon, n_levels)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![float_id, cycle_number, profile_date, lat, lon, n_levels],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert one measurement row (ingestion/seeding only)
    #[allow(clippy::too_many_arguments)]
    pub fn insert_measurement(
        &self,
        profile_id: i64,
        float_id: &str,
        time: &str,
        lat: f64,
        lon: f64,
        depth: f64,
        temperature: Option<f64>,
        salinity: Option<f64>,
        oxygen: Option<f64>,
        ph: Option<f64>,
        chlorophyll: Option<f64>,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO measurements
             (profile_id, float_id, time, lat, lon, depth,
              temperature, salinity, oxygen, ph, chlorophyll)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                profile_id,
                float_id,
                time,
                lat,
                lon,
                depth,
                temperature,
                salinity,
                oxygen,
                ph,
                chlorophyll
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_datetime(s)
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
