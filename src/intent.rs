//! Intent classifier - free text to structured query intent
//!
//! Pure and total: every input maps to an `Intent`, unrecognized text
//! falls back to `General`. Classification is rule-driven (keyword
//! families, fixed precedence), never statistical, so identical text
//! always yields an identical intent.

use regex::Regex;
use std::sync::OnceLock;

/// What kind of answer the query is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntentKind {
    /// AVG over the requested parameters
    Average,
    /// MAX of a single parameter plus the owning row
    Maximum,
    /// MIN of a single parameter plus the owning row
    Minimum,
    /// Measurement and float counts
    Count,
    /// Monthly averages over time
    Trend,
    /// Side-by-side raw measurements
    Comparison,
    /// Unspecific but in-domain
    #[default]
    General,
    /// Salutation, answered without touching store or index
    Greeting,
    /// Not about the measurement domain at all
    OutOfScope,
}

/// Measured parameters the dataset carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Temperature,
    Salinity,
    Depth,
    Oxygen,
    Ph,
    Chlorophyll,
}

impl Parameter {
    /// SQL column name in the measurements table
    pub fn column(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Salinity => "salinity",
            Parameter::Depth => "depth",
            Parameter::Oxygen => "oxygen",
            Parameter::Ph => "ph",
            Parameter::Chlorophyll => "chlorophyll",
        }
    }

    /// Display label for answer text
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Temperature => "Temperature",
            Parameter::Salinity => "Salinity",
            Parameter::Depth => "Depth",
            Parameter::Oxygen => "Dissolved Oxygen",
            Parameter::Ph => "pH",
            Parameter::Chlorophyll => "Chlorophyll",
        }
    }

    /// Measurement unit, empty for dimensionless parameters
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Temperature => "°C",
            Parameter::Salinity => "PSU",
            Parameter::Depth => "m",
            Parameter::Oxygen => "ml/L",
            Parameter::Ph => "",
            Parameter::Chlorophyll => "mg/m³",
        }
    }
}

/// Temporal constraints extracted from the query text
///
/// Each group is optional; within a group values combine with OR,
/// across groups with AND (year AND month AND day).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Temporal {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub days: Vec<u32>,
}

impl Temporal {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.months.is_empty() && self.days.is_empty()
    }
}

/// Spatial region tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    IndianOcean,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::IndianOcean => "Indian Ocean",
        }
    }
}

/// Structured representation of what a free-text query asks for
///
/// Built fresh per request, immutable, no persistent identity.
#[derive(Debug, Clone, Default)]
pub struct Intent {
    pub kind: IntentKind,
    /// Requested parameters in detection order; empty means the
    /// synthesizer applies its documented defaults.
    pub parameters: Vec<Parameter>,
    pub temporal: Temporal,
    pub region: Option<Region>,
}

/// Month number (1-12) to full English name
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Month number to three-letter abbreviation (trend display)
pub fn month_abbrev(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

const MONTH_PATTERN: &str = "january|february|march|april|may|june|july|august|september|october|\
     november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";

fn month_number(name: &str) -> Option<u32> {
    let n = match &name[..3.min(name.len())] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap())
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"\b({})\b", MONTH_PATTERN)).unwrap())
}

// "15 January" / "15th jan" - day precedes the month
fn day_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:{})\b",
            MONTH_PATTERN
        ))
        .unwrap()
    })
}

// "January 15" / "jan 15th" - month precedes the day
fn month_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(?:{})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b",
            MONTH_PATTERN
        ))
        .unwrap()
    })
}

/// Keyword family backing one parameter or aggregation kind
struct Family {
    pattern: &'static str,
    re: OnceLock<Regex>,
}

impl Family {
    const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            re: OnceLock::new(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.re
            .get_or_init(|| Regex::new(&format!(r"\b(?:{})\b", self.pattern)).unwrap())
            .is_match(text)
    }
}

static TEMPERATURE_WORDS: Family = Family::new(
    "temperature|temp|warm|warmer|warmest|warming|cold|colder|coldest|hot|hotter|hottest",
);
static SALINITY_WORDS: Family = Family::new("salinity|salt|saline|saltier|saltiest|psu");
static DEPTH_WORDS: Family = Family::new("depth|deep|deeper|deepest|shallow|surface");
static OXYGEN_WORDS: Family = Family::new("oxygen|o2");
static PH_WORDS: Family = Family::new("ph|acidity|acidic");
static CHLOROPHYLL_WORDS: Family = Family::new("chlorophyll|chla");

static AVERAGE_WORDS: Family = Family::new("average|mean|avg");
static MAXIMUM_WORDS: Family = Family::new("maximum|max|highest|warmest|hottest|deepest");
static MINIMUM_WORDS: Family = Family::new("minimum|min|lowest|coldest|shallowest");
static COUNT_WORDS: Family = Family::new("count|how many|number of");
static TREND_WORDS: Family = Family::new("trend|trends|over time|change|changes|changing");
static COMPARISON_WORDS: Family = Family::new("compare|comparison|difference|versus|vs");
static GREETING_WORDS: Family =
    Family::new("hello|hi|hey|good morning|good afternoon|good evening");

// Domain vocabulary for the scope check. A general query matching none
// of these terms is redirected rather than answered.
static DOMAIN_WORDS: Family = Family::new(
    "temperature|temp|salinity|salt|depth|ocean|sea|water|argo|float|floats|\
     measurement|measurements|profile|profiles|marine|oceanographic|oceanography|\
     chlorophyll|oxygen|ph|pressure|latitude|longitude|buoy|\
     indian ocean|arabian sea|bay of bengal",
);

static REGION_WORDS: Family = Family::new("indian ocean|arabian sea|bay of bengal");

/// Classify free text into a structured [`Intent`]
///
/// Deterministic and total. Conflicting aggregation keywords resolve by
/// fixed family precedence (average > maximum > minimum > count > trend >
/// comparison > greeting), not by position in the text.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();

    let mut intent = Intent {
        temporal: extract_temporal(&lower),
        ..Intent::default()
    };

    if REGION_WORDS.matches(&lower) {
        intent.region = Some(Region::IndianOcean);
    }

    for (family, parameter) in [
        (&TEMPERATURE_WORDS, Parameter::Temperature),
        (&SALINITY_WORDS, Parameter::Salinity),
        (&DEPTH_WORDS, Parameter::Depth),
        (&OXYGEN_WORDS, Parameter::Oxygen),
        (&PH_WORDS, Parameter::Ph),
        (&CHLOROPHYLL_WORDS, Parameter::Chlorophyll),
    ] {
        if family.matches(&lower) {
            intent.parameters.push(parameter);
        }
    }

    intent.kind = if AVERAGE_WORDS.matches(&lower) {
        IntentKind::Average
    } else if MAXIMUM_WORDS.matches(&lower) {
        IntentKind::Maximum
    } else if MINIMUM_WORDS.matches(&lower) {
        IntentKind::Minimum
    } else if COUNT_WORDS.matches(&lower) {
        IntentKind::Count
    } else if TREND_WORDS.matches(&lower) {
        IntentKind::Trend
    } else if COMPARISON_WORDS.matches(&lower) {
        IntentKind::Comparison
    } else if GREETING_WORDS.matches(&lower) {
        IntentKind::Greeting
    } else {
        IntentKind::General
    };

    // Scope check: a general query with zero domain terms is out of scope
    if intent.kind == IntentKind::General && !DOMAIN_WORDS.matches(&lower) {
        intent.kind = IntentKind::OutOfScope;
    }

    intent
}

fn extract_temporal(lower: &str) -> Temporal {
    let mut temporal = Temporal::default();

    for cap in year_re().captures_iter(lower) {
        if let Ok(year) = cap[1].parse::<i32>() {
            // Regex already constrains to 1900-2099
            if !temporal.years.contains(&year) {
                temporal.years.push(year);
            }
        }
    }

    for cap in month_re().captures_iter(lower) {
        if let Some(month) = month_number(&cap[1]) {
            if !temporal.months.contains(&month) {
                temporal.months.push(month);
            }
        }
    }

    // Day-before-month takes priority; fall back to month-before-day
    let mut day_caps: Vec<u32> = day_month_re()
        .captures_iter(lower)
        .filter_map(|cap| cap[1].parse::<u32>().ok())
        .collect();
    if day_caps.is_empty() {
        day_caps = month_day_re()
            .captures_iter(lower)
            .filter_map(|cap| cap[1].parse::<u32>().ok())
            .collect();
    }
    for day in day_caps {
        if (1..=31).contains(&day) && !temporal.days.contains(&day) {
            temporal.days.push(day);
        }
    }

    temporal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_average_with_year() {
        let intent = classify("Average temperature in 2010");
        assert_eq!(intent.kind, IntentKind::Average);
        assert_eq!(intent.parameters, vec![Parameter::Temperature]);
        assert_eq!(intent.temporal.years, vec![2010]);
        assert!(intent.temporal.months.is_empty());
    }

    #[test]
    fn test_classify_maximum_with_full_date() {
        let intent = classify("What was the maximum temperature on 15 January 2010?");
        assert_eq!(intent.kind, IntentKind::Maximum);
        assert_eq!(intent.temporal.years, vec![2010]);
        assert_eq!(intent.temporal.months, vec![1]);
        assert_eq!(intent.temporal.days, vec![15]);
    }

    #[test]
    fn test_day_after_month_with_ordinal() {
        let intent = classify("salinity on January 15th 2011");
        assert_eq!(intent.temporal.months, vec![1]);
        assert_eq!(intent.temporal.days, vec![15]);
        assert_eq!(intent.temporal.years, vec![2011]);
    }

    #[test]
    fn test_multiple_years_kept() {
        let intent = classify("compare ocean temperature between 2010 and 2012");
        assert_eq!(intent.temporal.years, vec![2010, 2012]);
        assert_eq!(intent.kind, IntentKind::Comparison);
    }

    #[test]
    fn test_year_outside_plausible_range_ignored() {
        let intent = classify("temperature in 1776 and 2150");
        assert!(intent.temporal.years.is_empty());
    }

    #[test]
    fn test_aggregation_precedence_average_beats_maximum() {
        // Both families present; fixed precedence wins regardless of position
        let intent = classify("maximum and average salinity");
        assert_eq!(intent.kind, IntentKind::Average);
    }

    #[test]
    fn test_precedence_minimum_beats_count() {
        let intent = classify("how many measurements show the minimum depth");
        assert_eq!(intent.kind, IntentKind::Minimum);
    }

    #[test]
    fn test_warmest_is_maximum_and_temperature() {
        let intent = classify("warmest water recorded");
        assert_eq!(intent.kind, IntentKind::Maximum);
        assert_eq!(intent.parameters, vec![Parameter::Temperature]);
    }

    #[test]
    fn test_trend_detection() {
        let intent = classify("salinity trend over time");
        assert_eq!(intent.kind, IntentKind::Trend);
        assert_eq!(intent.parameters, vec![Parameter::Salinity]);
    }

    #[test]
    fn test_count_phrase() {
        let intent = classify("how many argo floats reported in 2011?");
        assert_eq!(intent.kind, IntentKind::Count);
        assert_eq!(intent.temporal.years, vec![2011]);
    }

    #[test]
    fn test_greeting() {
        let intent = classify("Hello");
        assert_eq!(intent.kind, IntentKind::Greeting);
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn test_out_of_scope() {
        let intent = classify("What's the stock market doing?");
        assert_eq!(intent.kind, IntentKind::OutOfScope);
    }

    #[test]
    fn test_domain_term_keeps_general_in_scope() {
        let intent = classify("tell me about the ocean");
        assert_eq!(intent.kind, IntentKind::General);
    }

    #[test]
    fn test_region_tag() {
        let intent = classify("average temperature in the Arabian Sea");
        assert_eq!(intent.region, Some(Region::IndianOcean));
    }

    #[test]
    fn test_multiple_parameters_in_detection_order() {
        let intent = classify("average salinity and temperature in June");
        assert_eq!(
            intent.parameters,
            vec![Parameter::Temperature, Parameter::Salinity]
        );
        assert_eq!(intent.temporal.months, vec![6]);
    }

    #[test]
    fn test_ph_requires_word_boundary() {
        // "graph" must not register as a pH request
        let intent = classify("show me a graph of ocean measurements");
        assert!(!intent.parameters.contains(&Parameter::Ph));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let a = classify("Average temperature in 2010");
        let b = classify("Average temperature in 2010");
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.temporal, b.temporal);
    }
}
