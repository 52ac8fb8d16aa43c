//! Evidence document rendering
//!
//! Each sampled measurement becomes one prose summary plus a typed
//! metadata record. The phrasing is load-bearing: the composer's
//! context fallback extracts values with patterns keyed to these exact
//! phrases ("the water temperature was 26.84°C").

use serde::{Deserialize, Serialize};

use crate::intent::month_name;
use crate::store::SampledMeasurement;

/// Typed metadata stored next to each evidence document
///
/// Used for post-hoc filtering of similarity results and returned to
/// callers in the evidence bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocMetadata {
    pub measurement_id: i64,
    pub float_id: String,
    pub wmo_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub date: Option<String>,
    pub depth: f64,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub lat: f64,
    pub lon: f64,
    pub cycle_number: Option<i64>,
    pub has_bgc: bool,
}

/// Render one measurement into (document prose, metadata)
pub fn render_document(m: &SampledMeasurement) -> (String, DocMetadata) {
    let (date_str, year, month) = match m.time {
        Some(time) => {
            use chrono::Datelike;
            (
                time.format("%Y-%m-%d").to_string(),
                Some(time.year()),
                Some(time.month()),
            )
        }
        None => ("unknown date".to_string(), None, None),
    };

    let temp_str = match m.temperature {
        Some(t) => format!("{:.2}°C", t),
        None => "not measured".to_string(),
    };
    let sal_str = match m.salinity {
        Some(s) => format!("{:.2} PSU", s),
        None => "not measured".to_string(),
    };

    let mut bgc_info = String::new();
    if let Some(oxygen) = m.oxygen {
        bgc_info.push_str(&format!(" Dissolved oxygen was {:.2} ml/L.", oxygen));
    }
    if let Some(ph) = m.ph {
        bgc_info.push_str(&format!(" pH was {:.2}.", ph));
    }
    if let Some(chlorophyll) = m.chlorophyll {
        if chlorophyll > 0.01 {
            bgc_info.push_str(&format!(
                " Chlorophyll concentration was {:.3} mg/m³.",
                chlorophyll
            ));
        }
    }

    let wmo_str = m
        .wmo_id
        .map(|w| w.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let year_str = year.map(|y| y.to_string()).unwrap_or_else(|| "an unknown year".to_string());
    let month_str = month.map(month_name).unwrap_or("an unknown month");
    let cycle_str = m
        .cycle_number
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let deployed_str = m.deployment_date.as_deref().unwrap_or("an unknown date");

    let document = format!(
        "On {date} in {year} during {month}, ARGO float {float} (WMO ID: {wmo}) \
         recorded oceanographic measurements at latitude {lat:.3}° and longitude {lon:.3}° \
         in the Indian Ocean. At a depth of {depth:.1} meters, the water temperature was \
         {temp} and the salinity was {sal}.{bgc} This was measurement cycle {cycle} for \
         this float, which was deployed on {deployed}.",
        date = date_str,
        year = year_str,
        month = month_str,
        float = m.float_id,
        wmo = wmo_str,
        lat = m.lat,
        lon = m.lon,
        depth = m.depth,
        temp = temp_str,
        sal = sal_str,
        bgc = bgc_info,
        cycle = cycle_str,
        deployed = deployed_str,
    );

    let metadata = DocMetadata {
        measurement_id: m.id,
        float_id: m.float_id.clone(),
        wmo_id: m.wmo_id,
        year,
        month,
        date: m.time.map(|t| t.format("%Y-%m-%d").to_string()),
        depth: m.depth,
        temperature: m.temperature,
        salinity: m.salinity,
        lat: m.lat,
        lon: m.lon,
        cycle_number: m.cycle_number,
        has_bgc: m.oxygen.is_some() || m.ph.is_some() || m.chlorophyll.is_some(),
    };

    (document, metadata)
}
