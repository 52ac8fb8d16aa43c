//! Synthetic dataset seeding for demos and tests
//!
//! Generates a deterministic Indian Ocean float deployment: values are
//! trigonometric functions of (float, day, depth) indices, so repeated
//! seeding produces byte-identical databases. Realism targets the
//! upstream ingestion profile: warm mixed layer, thermocline decay,
//! near-constant salinity, BGC sensors on a subset of floats.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use log::info;

use crate::embeddings::Embedder;
use crate::index::{render_document, DocumentIndex};
use crate::store::MeasurementStore;

const DEPTH_LEVELS: [f64; 8] = [0.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0];
const INDEX_SAMPLE_LIMIT: usize = 500;

struct FloatSpec {
    float_id: &'static str,
    wmo_id: i64,
    lat: f64,
    lon: f64,
    has_bgc: bool,
}

const FLEET: [FloatSpec; 5] = [
    FloatSpec {
        float_id: "ARGO_9001",
        wmo_id: 1901234,
        lat: -8.5,
        lon: 72.3,
        has_bgc: false,
    },
    FloatSpec {
        float_id: "ARGO_9002",
        wmo_id: 1901235,
        lat: -12.1,
        lon: 80.6,
        has_bgc: true,
    },
    FloatSpec {
        float_id: "ARGO_9003",
        wmo_id: 1901236,
        lat: -4.9,
        lon: 67.8,
        has_bgc: false,
    },
    FloatSpec {
        float_id: "ARGO_9004",
        wmo_id: 1901237,
        lat: -15.7,
        lon: 88.2,
        has_bgc: true,
    },
    FloatSpec {
        float_id: "ARGO_9005",
        wmo_id: 1901238,
        lat: -2.3,
        lon: 76.0,
        has_bgc: false,
    },
];

/// Seed the store with a deterministic synthetic deployment
///
/// One profile per float per day starting 2010-01-10, all depth levels
/// per profile. Returns the number of measurements inserted.
pub fn seed_store(store: &MeasurementStore, days: u32) -> Result<usize> {
    let start = NaiveDate::from_ymd_opt(2010, 1, 10)
        .context("Invalid seed start date")?;
    let mut inserted = 0;

    for (fi, float) in FLEET.iter().enumerate() {
        store.insert_float(
            float.float_id,
            float.wmo_id,
            "2009-12-01",
            float.lat,
            float.lon,
        )?;

        for day in 0..days {
            let date = start + Duration::days(day as i64);
            // Slow drift along the float's trajectory
            let drift = day as f64 * 0.02;
            let lat = float.lat + drift * (fi as f64 * 0.7).sin();
            let lon = float.lon + drift * (fi as f64 * 0.7).cos();
            let time = format!("{} 06:00:00", date.format("%Y-%m-%d"));

            let profile_id = store.insert_profile(
                float.float_id,
                day as i64 + 1,
                &time,
                lat,
                lon,
                DEPTH_LEVELS.len() as i64,
            )?;

            for (di, &depth) in DEPTH_LEVELS.iter().enumerate() {
                let phase = fi as f64 + day as f64 * 0.3 + di as f64 * 0.1;
                store.insert_measurement(
                    profile_id,
                    float.float_id,
                    &time,
                    lat,
                    lon,
                    depth,
                    Some(temperature_at(depth, phase)),
                    Some(salinity_at(depth, phase)),
                    float.has_bgc.then(|| oxygen_at(depth, phase)),
                    float.has_bgc.then(|| ph_at(depth, phase)),
                    float.has_bgc.then(|| chlorophyll_at(depth, phase)),
                )?;
                inserted += 1;
            }
        }
    }

    info!("seeded {} measurements across {} floats", inserted, FLEET.len());
    Ok(inserted)
}

/// Render, embed, and index a sample of the stored measurements
///
/// Returns the number of documents indexed.
pub fn build_index(
    store: &MeasurementStore,
    index: &DocumentIndex,
    embedder: &mut dyn Embedder,
) -> Result<usize> {
    let sampled = store
        .sample_measurements(INDEX_SAMPLE_LIMIT)
        .context("Failed to sample measurements for indexing")?;

    let rendered: Vec<_> = sampled.iter().map(render_document).collect();
    let texts: Vec<String> = rendered.iter().map(|(text, _)| text.clone()).collect();
    let embeddings = embedder
        .embed_batch(&texts)
        .context("Failed to embed sampled documents")?;

    for ((text, metadata), embedding) in rendered.iter().zip(embeddings.iter()) {
        index.insert(text, metadata, embedding)?;
    }
    index.save().context("Failed to persist document index")?;

    info!("indexed {} documents", rendered.len());
    Ok(rendered.len())
}

// Warm mixed layer, exponential thermocline decay toward 4°C deep water
fn temperature_at(depth: f64, phase: f64) -> f64 {
    let surface = 28.0 + 1.5 * phase.sin();
    let deep = 4.0;
    deep + (surface - deep) * (-depth / 150.0).exp()
}

// Indian Ocean surface salinity band, slight increase with depth
fn salinity_at(depth: f64, phase: f64) -> f64 {
    34.8 + 0.3 * (phase * 0.5).cos() + depth * 0.0002
}

fn oxygen_at(depth: f64, phase: f64) -> f64 {
    let surface = 4.8 + 0.3 * phase.sin();
    (surface - depth * 0.002).max(1.5)
}

fn ph_at(depth: f64, phase: f64) -> f64 {
    8.1 - depth * 0.0001 + 0.02 * phase.cos()
}

// Chlorophyll concentrated near the surface, negligible below 200m
fn chlorophyll_at(depth: f64, phase: f64) -> f64 {
    (0.4 + 0.1 * phase.sin()) * (-depth / 80.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_seed_is_deterministic() -> Result<()> {
        let a = MeasurementStore::open_in_memory()?;
        let b = MeasurementStore::open_in_memory()?;
        assert_eq!(seed_store(&a, 3)?, seed_store(&b, 3)?);

        let sample_a = a.sample_measurements(10)?;
        let sample_b = b.sample_measurements(10)?;
        for (x, y) in sample_a.iter().zip(sample_b.iter()) {
            assert_eq!(x.float_id, y.float_id);
            assert_eq!(x.temperature, y.temperature);
            assert_eq!(x.salinity, y.salinity);
        }
        Ok(())
    }

    #[test]
    fn test_seed_counts_and_coverage() -> Result<()> {
        let store = MeasurementStore::open_in_memory()?;
        let inserted = seed_store(&store, 11)?;
        assert_eq!(inserted, 5 * 11 * DEPTH_LEVELS.len());

        let coverage = store.coverage()?;
        assert_eq!(coverage.measurements, inserted as i64);
        assert_eq!(coverage.floats, 5);
        assert_eq!(coverage.start, NaiveDate::from_ymd_opt(2010, 1, 10));
        assert_eq!(coverage.end, NaiveDate::from_ymd_opt(2010, 1, 20));
        Ok(())
    }

    #[test]
    fn test_temperature_profile_decreases_with_depth() {
        let surface = temperature_at(0.0, 1.0);
        let mid = temperature_at(100.0, 1.0);
        let deep = temperature_at(1000.0, 1.0);
        assert!(surface > mid && mid > deep);
        assert!(deep >= 4.0);
        assert!(surface < 30.0);
    }

    #[test]
    fn test_bgc_only_on_flagged_floats() -> Result<()> {
        let store = MeasurementStore::open_in_memory()?;
        seed_store(&store, 1)?;
        let sampled = store.sample_measurements(100)?;

        for m in &sampled {
            let has_bgc = m.oxygen.is_some();
            match m.float_id.as_str() {
                "ARGO_9002" | "ARGO_9004" => assert!(has_bgc),
                _ => assert!(!has_bgc),
            }
            assert_eq!(m.ph.is_some(), has_bgc);
            assert_eq!(m.chlorophyll.is_some(), has_bgc);
        }
        Ok(())
    }
}
