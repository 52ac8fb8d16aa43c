//! Executor and normalizer - run a synthesized request, canonicalize rows
//!
//! Store failures and deadline overruns both surface as `None`; the
//! composer falls back on its own. A valid query with zero rows still
//! yields a `QueryResult` so the no-data message can name the unmatched
//! temporal filter.

use anyhow::Result;
use chrono::NaiveDateTime;
use log::warn;
use rusqlite::types::ValueRef;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use super::request::QueryRequest;
use crate::intent::{month_name, Temporal};
use crate::store::MeasurementStore;

/// Canonical scalar value; integers and floats collapse into `Number`
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
    /// ISO-like timestamp string
    Timestamp(String),
    Null,
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) | Scalar::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Number(n) => serde_json::json!(n),
            Scalar::Text(s) | Scalar::Timestamp(s) => serde_json::json!(s),
            Scalar::Null => serde_json::Value::Null,
        }
    }
}

/// Ordered mapping of output-column name to scalar value
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Scalar)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    /// Numeric value of a column, `None` when absent or null
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Scalar::as_f64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Scalar::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &(String, Scalar)> {
        self.columns.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Result of executing one query request
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub row_count: usize,
    /// Set on zero rows when the intent carried temporal filters
    pub message: Option<String>,
}

/// Execute a request against the store with a deadline
///
/// `None` means the store was unreachable or the deadline passed; both
/// count as the resource being unavailable. The query runs on a worker
/// thread; a straggler past the deadline finishes in the background and
/// its result is discarded.
pub fn execute(
    store: &Arc<MeasurementStore>,
    request: &QueryRequest,
    timeout: Duration,
) -> Option<QueryResult> {
    let sql = request.to_sql();
    let store = Arc::clone(store);
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let result = run_query(&store, &sql);
        let _ = tx.send(result);
    });

    let rows = match rx.recv_timeout(timeout) {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            warn!("query execution failed: {e:#}");
            return None;
        }
        Err(_) => {
            warn!("query timed out after {timeout:?}");
            return None;
        }
    };

    let row_count = rows.len();
    let message = if row_count == 0 {
        no_data_message(&request.temporal)
    } else {
        None
    };

    Some(QueryResult {
        rows,
        row_count,
        message,
    })
}

fn run_query(store: &MeasurementStore, sql: &str) -> Result<Vec<Row>> {
    store.with_connection(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                columns.push((name.clone(), normalize(name, row.get_ref(i)?)));
            }
            rows.push(Row::new(columns));
        }
        Ok(rows)
    })
}

// Null -> explicit Null, all numerics -> Number, time-shaped text -> ISO
fn normalize(name: &str, value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Number(i as f64),
        ValueRef::Real(f) => Scalar::Number(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if name == "time" || name.ends_with("_date") {
                Scalar::Timestamp(to_iso(&text))
            } else {
                Scalar::Text(text)
            }
        }
        ValueRef::Blob(_) => Scalar::Null,
    }
}

fn to_iso(text: &str) -> String {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|_| text.to_string())
}

// Name the unmatched temporal filter: "January 15, 2010", "January 2010",
// "2010", or just "January 15".
fn no_data_message(temporal: &Temporal) -> Option<String> {
    if temporal.is_empty() {
        return None;
    }

    let month = temporal.months.first().map(|&m| month_name(m));
    let day = temporal.days.first();
    let year = temporal.years.first();

    let when = match (month, day, year) {
        (Some(month), Some(day), Some(year)) => format!("{} {}, {}", month, day, year),
        (Some(month), Some(day), None) => format!("{} {}", month, day),
        (Some(month), None, Some(year)) => format!("{} {}", month, year),
        (Some(month), None, None) => month.to_string(),
        (None, _, Some(year)) => year.to_string(),
        (None, _, None) => return Some("No data available for the requested time".to_string()),
    };

    Some(format!("No data available for {}", when))
}
