//! Answer composer - fixed decision ladder over the gathered evidence
//!
//! Precedence: greeting, scope clarification, query rows, no-data
//! message, retrieved context, generic fallback. Rows always dominate
//! context documents; documents in that case serve only as supporting
//! evidence attached to the answer bundle.

use crate::intent::{month_name, Intent, IntentKind};
use crate::query::QueryResult;
use crate::store::DatasetCoverage;

use super::templates::{group_thousands, TemplateRenderer};

/// Composes the final answer text from intent, context, and query result
pub struct Composer {
    renderer: Box<dyn TemplateRenderer>,
}

impl Composer {
    pub fn new(renderer: Box<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }

    /// Walk the decision ladder and produce the answer text
    pub fn compose(
        &self,
        intent: &Intent,
        documents: &[String],
        result: Option<&QueryResult>,
        coverage: &DatasetCoverage,
    ) -> String {
        match intent.kind {
            IntentKind::Greeting => return greeting(coverage),
            IntentKind::OutOfScope => return SCOPE_CLARIFICATION.to_string(),
            _ => {}
        }

        if let Some(result) = result {
            if !result.rows.is_empty() {
                return self.renderer.render(intent, &result.rows, documents);
            }
            if let Some(message) = &result.message {
                return no_data(message, coverage);
            }
        }

        if !documents.is_empty() {
            return self.renderer.render(intent, &[], documents);
        }

        fallback(intent)
    }
}

const SCOPE_CLARIFICATION: &str = "I'm an assistant specialized in ARGO float oceanographic \
data. I can help you explore ocean temperature, salinity, and depth measurements, float \
locations, and measurement trends. What would you like to know about the ocean data?";

fn greeting(coverage: &DatasetCoverage) -> String {
    let mut text = String::from("Hello! I'm your ARGO float oceanographic data assistant. ");

    if coverage.measurements > 0 {
        text.push_str(&format!(
            "I have access to {} measurements from {} ARGO floats in the Indian Ocean region",
            group_thousands(coverage.measurements),
            group_thousands(coverage.floats)
        ));
        if let Some(range) = coverage.date_range() {
            text.push_str(&format!(", covering {}", range));
        }
        text.push_str(". ");
    } else {
        text.push_str("I have access to ARGO float measurements from the Indian Ocean region. ");
    }

    text.push_str(
        "I can help you analyze temperature, salinity, and depth data. Try asking about \
         'average temperature in 2010' or 'maximum salinity in January 2010'.",
    );
    text
}

fn no_data(message: &str, coverage: &DatasetCoverage) -> String {
    let mut text = format!(
        "I searched for data matching your query but found none. {}.",
        message
    );
    if let Some(range) = coverage.date_range() {
        text.push_str(&format!(
            " The available data covers {}. Try asking about dates in that range instead.",
            range
        ));
    }
    text
}

fn fallback(intent: &Intent) -> String {
    let mut subject = String::new();
    if !intent.parameters.is_empty() {
        let params: Vec<&str> = intent.parameters.iter().map(|p| p.column()).collect();
        subject.push_str(&params.join(" and "));
    } else {
        subject.push_str("oceanographic conditions");
    }
    if !intent.temporal.months.is_empty() {
        let months: Vec<&str> = intent
            .temporal
            .months
            .iter()
            .map(|&m| month_name(m))
            .collect();
        subject.push_str(&format!(" in {}", months.join(" and ")));
    }
    if !intent.temporal.years.is_empty() {
        let years: Vec<String> = intent.temporal.years.iter().map(|y| y.to_string()).collect();
        subject.push_str(&format!(" in {}", years.join(" and ")));
    }

    format!(
        "I understand you're asking about {} in the ARGO float dataset. I couldn't find \
         matching data for that exact question, but the dataset contains temperature, \
         salinity, and depth measurements from ARGO floats in the Indian Ocean. Try asking \
         about 'average temperature in 2010' or 'salinity measurements from January 2010'.",
        subject
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;
    use crate::query::{Row, Scalar};
    use crate::respond::FixedTemplates;
    use chrono::NaiveDate;

    fn composer() -> Composer {
        Composer::new(Box::new(FixedTemplates))
    }

    fn coverage() -> DatasetCoverage {
        DatasetCoverage {
            start: NaiveDate::from_ymd_opt(2010, 1, 10),
            end: NaiveDate::from_ymd_opt(2010, 1, 20),
            measurements: 122_027,
            floats: 5,
        }
    }

    fn avg_result() -> QueryResult {
        QueryResult {
            rows: vec![Row::new(vec![
                ("avg_temperature".to_string(), Scalar::Number(26.84)),
                ("measurement_count".to_string(), Scalar::Number(100.0)),
            ])],
            row_count: 1,
            message: None,
        }
    }

    #[test]
    fn test_greeting_quotes_coverage() {
        let intent = classify("hello");
        let answer = composer().compose(&intent, &[], None, &coverage());
        assert!(answer.contains("122,027 measurements from 5 ARGO floats"));
        assert!(answer.contains("January 10, 2010 to January 20, 2010"));
    }

    #[test]
    fn test_greeting_without_coverage_stays_generic() {
        let intent = classify("hi there");
        let answer = composer().compose(&intent, &[], None, &DatasetCoverage::default());
        assert!(answer.starts_with("Hello!"));
        assert!(!answer.contains("0 measurements"));
    }

    #[test]
    fn test_out_of_scope_gets_clarification() {
        let intent = classify("what's the stock market doing today?");
        let answer = composer().compose(&intent, &[], None, &coverage());
        assert!(answer.contains("specialized in ARGO float oceanographic data"));
    }

    #[test]
    fn test_rows_dominate_context_documents() {
        let intent = classify("average temperature in 2010");
        let docs = vec!["the water temperature was 99.99°C".to_string()];
        let result = avg_result();
        let answer = composer().compose(&intent, &docs, Some(&result), &coverage());
        assert!(answer.contains("**Average Temperature**: 26.84°C"));
        assert!(!answer.contains("99.99"));
    }

    #[test]
    fn test_no_data_message_names_period_and_range() {
        let intent = classify("average temperature on 15 January 2015");
        let result = QueryResult {
            rows: vec![],
            row_count: 0,
            message: Some("No data available for January 15, 2015".to_string()),
        };
        let answer = composer().compose(&intent, &[], Some(&result), &coverage());
        assert!(answer.contains("No data available for January 15, 2015"));
        assert!(answer.contains("January 10, 2010 to January 20, 2010"));
    }

    #[test]
    fn test_context_documents_used_when_no_rows() {
        let intent = classify("average temperature");
        let docs = vec!["the water temperature was 26.84°C in 2010".to_string()];
        let answer = composer().compose(&intent, &docs, None, &coverage());
        assert!(answer.contains("Based on the ARGO float data I have access to"));
    }

    #[test]
    fn test_fallback_mentions_requested_parameters() {
        let intent = classify("tell me something about salinity in 2010");
        let answer = composer().compose(&intent, &[], None, &coverage());
        assert!(answer.contains("salinity"));
        assert!(answer.contains("2010"));
    }
}
