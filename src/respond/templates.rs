//! Narrative templates for data-driven and context-driven answers
//!
//! `TemplateRenderer` is the seam the composer phrases answers through:
//! one method over (intent, rows, documents). `FixedTemplates` is the
//! deterministic default backend; a generative backend can replace it
//! without touching intent, retrieval, or query logic.

use super::mentions::extract_mentions;
use crate::intent::{month_abbrev, Intent, IntentKind, Parameter};
use crate::query::Row;

/// Pluggable phrasing backend
pub trait TemplateRenderer: Send + Sync {
    /// Render an answer from query rows (authoritative) or, when rows
    /// are empty, from retrieved document prose.
    fn render(&self, intent: &Intent, rows: &[Row], documents: &[String]) -> String;
}

/// Deterministic fixed-template backend
pub struct FixedTemplates;

const ALL_PARAMETERS: [Parameter; 6] = [
    Parameter::Temperature,
    Parameter::Salinity,
    Parameter::Depth,
    Parameter::Oxygen,
    Parameter::Ph,
    Parameter::Chlorophyll,
];

impl TemplateRenderer for FixedTemplates {
    fn render(&self, intent: &Intent, rows: &[Row], documents: &[String]) -> String {
        if rows.is_empty() {
            return render_context_summary(documents);
        }

        match intent.kind {
            IntentKind::Average => render_average(intent, &rows[0]),
            IntentKind::Maximum => render_extreme(&rows[0], "highest", "max"),
            IntentKind::Minimum => render_extreme(&rows[0], "lowest", "min"),
            IntentKind::Count => render_count(intent, &rows[0]),
            IntentKind::Trend => render_trend(rows),
            _ => render_listing(rows),
        }
    }
}

fn render_average(intent: &Intent, row: &Row) -> String {
    let mut answer = String::from("Based on the ARGO float measurements I found");
    answer.push_str(&temporal_preface(intent));
    answer.push_str(":\n\n");

    for parameter in ALL_PARAMETERS {
        let column = format!("avg_{}", parameter.column());
        if let Some(value) = row.number(&column) {
            answer.push_str(&format!(
                "**Average {}**: {:.2}{}\n",
                parameter.label(),
                value,
                unit_suffix(parameter)
            ));
        }
    }
    if let Some(count) = row.number("measurement_count") {
        answer.push_str(&format!(
            "**Based on**: {} measurements\n",
            group_thousands(count as i64)
        ));
    }

    answer.push_str(
        "\nThis data comes from ARGO floats deployed across the Indian Ocean region, \
         providing accurate oceanographic measurements.",
    );
    answer
}

fn render_extreme(row: &Row, extreme: &str, prefix: &str) -> String {
    let mut answer = format!("The {} ", extreme);

    let aggregate = ALL_PARAMETERS.iter().find_map(|p| {
        let column = format!("{}_{}", prefix, p.column());
        row.number(&column).map(|value| (*p, value))
    });

    match aggregate {
        Some((parameter, value)) => {
            answer.push_str(&format!(
                "{} I found was **{:.2}{}**",
                parameter.column(),
                value,
                unit_suffix(parameter)
            ));
        }
        None => answer.push_str("value I found could not be determined"),
    }

    if let Some(time) = row.text("time") {
        answer.push_str(&format!(", recorded on {}", time));
    }
    if let (Some(lat), Some(lon)) = (row.number("lat"), row.number("lon")) {
        answer.push_str(&format!(
            " at location {:.2}°{}, {:.2}°{}",
            lat.abs(),
            if lat < 0.0 { "S" } else { "N" },
            lon.abs(),
            if lon < 0.0 { "W" } else { "E" }
        ));
    }
    if let Some(depth) = row.number("depth") {
        answer.push_str(&format!(" at {:.0}m depth", depth));
    }
    if let Some(float_id) = row.text("float_id") {
        answer.push_str(&format!(" by ARGO float {}", float_id));
    }

    answer.push('.');
    answer
}

fn render_count(intent: &Intent, row: &Row) -> String {
    let mut answer = String::from("Based on your query, I found:\n\n");

    if let Some(total) = row.number("total_measurements") {
        answer.push_str(&format!(
            "**Total Measurements**: {}\n",
            group_thousands(total as i64)
        ));
    }
    if let Some(floats) = row.number("total_floats") {
        answer.push_str(&format!("**ARGO Floats**: {}\n", group_thousands(floats as i64)));
    }

    let years = &intent.temporal.years;
    match years.as_slice() {
        [] => {}
        [year] => answer.push_str(&format!("**Year**: {}\n", year)),
        _ => {
            let min = years.iter().min().unwrap_or(&0);
            let max = years.iter().max().unwrap_or(&0);
            answer.push_str(&format!("**Years**: {}-{}\n", min, max));
        }
    }

    answer.push_str(
        "\nThis data represents real oceanographic measurements from the ARGO \
         global ocean observing system.",
    );
    answer
}

fn render_trend(rows: &[Row]) -> String {
    let mut answer = String::from("Here's the temporal trend I found:\n\n");

    for row in rows {
        let (year, month) = match (row.number("year"), row.number("month")) {
            (Some(year), Some(month)) => (year as i32, month as u32),
            _ => continue,
        };
        answer.push_str(&format!("**{} {}**: ", month_abbrev(month), year));

        let mut parts = Vec::new();
        if let Some(temp) = row.number("avg_temperature") {
            parts.push(format!("Temp {:.1}°C", temp));
        }
        if let Some(sal) = row.number("avg_salinity") {
            parts.push(format!("Salinity {:.1} PSU", sal));
        }
        answer.push_str(&parts.join(", "));

        if let Some(count) = row.number("measurement_count") {
            answer.push_str(&format!(" ({} measurements)", count as i64));
        }
        answer.push('\n');
    }

    answer.push_str(
        "\nThis shows the temporal variation in oceanographic conditions measured \
         by ARGO floats.",
    );
    answer
}

const LISTING_DETAIL: usize = 5;

fn render_listing(rows: &[Row]) -> String {
    let mut answer = format!(
        "I found {} specific measurements matching your query:\n\n",
        rows.len()
    );

    for (i, row) in rows.iter().take(LISTING_DETAIL).enumerate() {
        answer.push_str(&format!("**Measurement {}**:\n", i + 1));
        if let Some(temp) = row.number("temperature") {
            answer.push_str(&format!("  Temperature: {:.2}°C\n", temp));
        }
        if let Some(sal) = row.number("salinity") {
            answer.push_str(&format!("  Salinity: {:.2} PSU\n", sal));
        }
        if let Some(time) = row.text("time") {
            answer.push_str(&format!("  Date: {}\n", time));
        }
        if let Some(depth) = row.number("depth") {
            answer.push_str(&format!("  Depth: {:.0}m\n", depth));
        }
        if let Some(float_id) = row.text("float_id") {
            answer.push_str(&format!("  Float: {}\n", float_id));
        }
        answer.push('\n');
    }

    if rows.len() > LISTING_DETAIL {
        answer.push_str(&format!(
            "... and {} more measurements.\n\n",
            rows.len() - LISTING_DETAIL
        ));
    }

    answer.push_str("This data comes from real ARGO float measurements in the Indian Ocean.");
    answer
}

// Context documents are an approximation: summarize whatever values
// their prose mentions instead of quoting them as authoritative.
fn render_context_summary(documents: &[String]) -> String {
    let mentions = extract_mentions(documents);
    let mut answer = String::from("Based on the ARGO float data I have access to:\n\n");

    if let Some((min, max, avg)) = stats(&mentions.temperatures) {
        answer.push_str(&format!(
            "Temperature measurements range from {:.1}°C to {:.1}°C (average {:.1}°C)\n",
            min, max, avg
        ));
    }
    if let Some((min, max, avg)) = stats(&mentions.salinities) {
        answer.push_str(&format!(
            "Salinity measurements range from {:.1} to {:.1} PSU (average {:.1})\n",
            min, max, avg
        ));
    }
    if !mentions.years.is_empty() {
        let min = mentions.years.iter().min().unwrap_or(&0);
        let max = mentions.years.iter().max().unwrap_or(&0);
        answer.push_str(&format!("Data spans from {} to {}\n", min, max));
    }

    answer.push_str(&format!(
        "\nThis information comes from {} relevant ARGO float measurements I found \
         in the database.",
        documents.len()
    ));
    answer
}

fn stats(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, max, avg))
}

fn temporal_preface(intent: &Intent) -> String {
    let years = &intent.temporal.years;
    match years.as_slice() {
        [] => String::new(),
        [year] => format!(" from {}", year),
        _ => {
            let min = years.iter().min().unwrap_or(&0);
            let max = years.iter().max().unwrap_or(&0);
            format!(" from {} to {}", min, max)
        }
    }
}

fn unit_suffix(parameter: Parameter) -> String {
    let unit = parameter.unit();
    if unit.is_empty() {
        String::new()
    } else if unit == "°C" {
        unit.to_string()
    } else {
        format!(" {}", unit)
    }
}

/// Format an integer with comma thousands separators
pub(crate) fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
