//! Numeric mention extraction from evidence document prose
//!
//! The patterns mirror the phrasing produced by `index::render_document`;
//! the context fallback summarizes whatever values the retrieved
//! documents happen to mention.

use regex::Regex;
use std::sync::OnceLock;

/// Values mentioned across a set of documents
#[derive(Debug, Clone, Default)]
pub struct Mentions {
    pub temperatures: Vec<f64>,
    pub salinities: Vec<f64>,
    pub years: Vec<i32>,
}

impl Mentions {
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty() && self.salinities.is_empty() && self.years.is_empty()
    }
}

fn temperature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"temperature was ([0-9]+(?:\.[0-9]+)?)°C").unwrap())
}

fn salinity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"salinity was ([0-9]+(?:\.[0-9]+)?) PSU").unwrap())
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"in ((?:19|20)\d{2})\b").unwrap())
}

/// Extract numeric mentions from document prose
pub fn extract_mentions(documents: &[String]) -> Mentions {
    let mut mentions = Mentions::default();

    for doc in documents {
        for cap in temperature_re().captures_iter(doc) {
            if let Ok(value) = cap[1].parse() {
                mentions.temperatures.push(value);
            }
        }
        for cap in salinity_re().captures_iter(doc) {
            if let Ok(value) = cap[1].parse() {
                mentions.salinities.push(value);
            }
        }
        for cap in year_re().captures_iter(doc) {
            if let Ok(value) = cap[1].parse() {
                mentions.years.push(value);
            }
        }
    }

    mentions
}
