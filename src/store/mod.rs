//! Structured store - SQLite access to the measurement dataset
//!
//! Three relational tables (floats, profiles, measurements) joined by
//! float id and profile id. This engine only reads; the ingestion
//! collaborator (or the bundled seeding tool) writes.

mod measurements;

pub use measurements::{DatasetCoverage, MeasurementStore, SampledMeasurement};
