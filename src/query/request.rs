//! Query synthesizer - intent to bounded aggregation request
//!
//! Deterministic builder: each intent kind maps to exactly one query
//! shape with a hard row cap. Temporal values come from the classifier
//! and are integers by construction, so SQL is rendered with numeric
//! literals only.

use crate::intent::{Intent, IntentKind, Parameter, Temporal};

/// Extreme direction for maximum/minimum queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

impl Direction {
    fn order(&self) -> &'static str {
        match self {
            Direction::Max => "DESC",
            Direction::Min => "ASC",
        }
    }

    /// Column alias prefix ("max" / "min")
    pub fn prefix(&self) -> &'static str {
        match self {
            Direction::Max => "max",
            Direction::Min => "min",
        }
    }
}

/// One of the fixed catalogue of aggregation shapes
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    /// AVG per parameter plus row count, single row
    Average { parameters: Vec<Parameter> },
    /// Extreme of one parameter plus the owning row's context
    Extreme {
        parameter: Parameter,
        direction: Direction,
    },
    /// COUNT(*) and COUNT(DISTINCT float_id), single row
    Count,
    /// AVG per parameter grouped by (year, month), ascending
    Trend { parameters: Vec<Parameter> },
    /// Raw recent measurements (general and comparison queries)
    Listing,
}

/// Bounded aggregation request derived from an intent
///
/// Created and discarded within a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub shape: QueryShape,
    pub temporal: Temporal,
    /// Hard result-row cap, bounds cost and response size
    pub cap: usize,
}

const TREND_CAP: usize = 12;
const LISTING_CAP: usize = 10;

/// Map an intent to a query request, or `None` when no query is needed
///
/// Returns `None` exactly for greeting and out-of-scope intents.
pub fn synthesize(intent: &Intent) -> Option<QueryRequest> {
    let shape = match intent.kind {
        IntentKind::Greeting | IntentKind::OutOfScope => return None,
        IntentKind::Average => QueryShape::Average {
            parameters: average_parameters(intent),
        },
        IntentKind::Maximum => QueryShape::Extreme {
            parameter: extreme_parameter(intent),
            direction: Direction::Max,
        },
        IntentKind::Minimum => QueryShape::Extreme {
            parameter: extreme_parameter(intent),
            direction: Direction::Min,
        },
        IntentKind::Count => QueryShape::Count,
        IntentKind::Trend => QueryShape::Trend {
            parameters: average_parameters(intent),
        },
        IntentKind::General | IntentKind::Comparison => QueryShape::Listing,
    };

    let cap = match &shape {
        QueryShape::Trend { .. } => TREND_CAP,
        QueryShape::Listing => LISTING_CAP,
        _ => 1,
    };

    Some(QueryRequest {
        shape,
        temporal: intent.temporal.clone(),
        cap,
    })
}

// Documented default policy: averages over temperature and salinity when
// nothing was requested explicitly.
fn average_parameters(intent: &Intent) -> Vec<Parameter> {
    if intent.parameters.is_empty() {
        vec![Parameter::Temperature, Parameter::Salinity]
    } else {
        intent.parameters.clone()
    }
}

// Documented default policy: an extreme needs one scalar to order by;
// temperature unless salinity was requested and temperature was not.
fn extreme_parameter(intent: &Intent) -> Parameter {
    if intent.parameters.contains(&Parameter::Temperature) {
        Parameter::Temperature
    } else {
        intent
            .parameters
            .first()
            .copied()
            .unwrap_or(Parameter::Temperature)
    }
}

impl QueryRequest {
    /// Render the request as SQLite SQL
    pub fn to_sql(&self) -> String {
        let from = "FROM measurements m \
                    JOIN floats f ON m.float_id = f.float_id \
                    JOIN profiles p ON m.profile_id = p.profile_id";

        let mut conditions = self.null_exclusions();
        conditions.extend(temporal_conditions(&self.temporal));
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let (select, grouping, order_by) = match &self.shape {
            QueryShape::Average { parameters } => {
                let mut cols: Vec<String> = parameters
                    .iter()
                    .map(|p| format!("AVG(m.{col}) AS avg_{col}", col = p.column()))
                    .collect();
                cols.push("COUNT(*) AS measurement_count".to_string());
                // AVG over zero matching rows would yield one all-NULL
                // row; suppress it so the zero-row path can speak.
                (
                    format!("SELECT {}", cols.join(", ")),
                    "HAVING COUNT(*) > 0",
                    String::new(),
                )
            }
            QueryShape::Extreme {
                parameter,
                direction,
            } => {
                let col = parameter.column();
                let select = format!(
                    "SELECT m.{col} AS {prefix}_{col}, m.time, m.lat, m.lon, m.depth, m.float_id",
                    prefix = direction.prefix(),
                );
                let order = format!("ORDER BY m.{} {}", col, direction.order());
                (select, "", order)
            }
            QueryShape::Count => (
                "SELECT COUNT(*) AS total_measurements, \
                 COUNT(DISTINCT m.float_id) AS total_floats"
                    .to_string(),
                "",
                String::new(),
            ),
            QueryShape::Trend { parameters } => {
                let mut cols = vec![
                    "CAST(strftime('%Y', m.time) AS INTEGER) AS year".to_string(),
                    "CAST(strftime('%m', m.time) AS INTEGER) AS month".to_string(),
                ];
                cols.extend(
                    parameters
                        .iter()
                        .map(|p| format!("AVG(m.{col}) AS avg_{col}", col = p.column())),
                );
                cols.push("COUNT(*) AS measurement_count".to_string());
                (
                    format!("SELECT {}", cols.join(", ")),
                    "GROUP BY year, month",
                    "ORDER BY year, month".to_string(),
                )
            }
            QueryShape::Listing => (
                "SELECT m.temperature, m.salinity, m.time, m.lat, m.lon, \
                 m.depth, m.float_id, f.wmo_id"
                    .to_string(),
                "",
                "ORDER BY m.time DESC".to_string(),
            ),
        };

        let limit = format!("LIMIT {}", self.cap);

        [select.as_str(), from, &where_clause, grouping, &order_by, &limit]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    // NULL exclusion for every parameter being aggregated or listed
    fn null_exclusions(&self) -> Vec<String> {
        let columns: Vec<&'static str> = match &self.shape {
            QueryShape::Average { parameters } | QueryShape::Trend { parameters } => {
                parameters.iter().map(|p| p.column()).collect()
            }
            QueryShape::Extreme { parameter, .. } => vec![parameter.column()],
            QueryShape::Count => vec![],
            QueryShape::Listing => vec!["temperature", "salinity"],
        };
        columns
            .into_iter()
            .map(|col| format!("m.{} IS NOT NULL", col))
            .collect()
    }
}

// Years OR years, months OR months, days OR days; groups combine with AND.
fn temporal_conditions(temporal: &Temporal) -> Vec<String> {
    let mut conditions = Vec::new();

    if !temporal.years.is_empty() {
        conditions.push(or_group(
            temporal.years.iter().map(|y| {
                format!("CAST(strftime('%Y', m.time) AS INTEGER) = {}", y)
            }),
        ));
    }
    if !temporal.months.is_empty() {
        conditions.push(or_group(temporal.months.iter().map(|mo| {
            format!("CAST(strftime('%m', m.time) AS INTEGER) = {}", mo)
        })));
    }
    if !temporal.days.is_empty() {
        conditions.push(or_group(temporal.days.iter().map(|d| {
            format!("CAST(strftime('%d', m.time) AS INTEGER) = {}", d)
        })));
    }

    conditions
}

fn or_group(clauses: impl Iterator<Item = String>) -> String {
    let joined: Vec<String> = clauses.collect();
    format!("({})", joined.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;

    #[test]
    fn test_synthesize_none_for_greeting_and_out_of_scope() {
        assert!(synthesize(&classify("Hello")).is_none());
        assert!(synthesize(&classify("What's the stock market doing?")).is_none());
    }

    #[test]
    fn test_synthesize_some_for_every_other_kind() {
        for text in [
            "average temperature",
            "maximum salinity",
            "minimum depth of measurements",
            "how many floats",
            "temperature trend",
            "compare temperature and salinity",
            "tell me about the ocean",
        ] {
            assert!(synthesize(&classify(text)).is_some(), "query: {}", text);
        }
    }

    #[test]
    fn test_average_defaults_to_temperature_and_salinity() {
        let intent = classify("what is the average in the ocean?");
        let request = synthesize(&intent).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("AVG(m.temperature) AS avg_temperature"));
        assert!(sql.contains("AVG(m.salinity) AS avg_salinity"));
        assert!(sql.contains("COUNT(*) AS measurement_count"));
        assert!(sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn test_average_year_filter_and_null_exclusion() {
        let request = synthesize(&classify("Average temperature in 2010")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("m.temperature IS NOT NULL"));
        assert!(sql.contains("CAST(strftime('%Y', m.time) AS INTEGER) = 2010"));
        assert!(!sql.contains("avg_salinity"));
    }

    #[test]
    fn test_multiple_years_or_combined() {
        let request = synthesize(&classify("average temperature in 2010 and 2011")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains(
            "(CAST(strftime('%Y', m.time) AS INTEGER) = 2010 OR \
             CAST(strftime('%Y', m.time) AS INTEGER) = 2011)"
        ));
    }

    #[test]
    fn test_full_date_combines_groups_with_and() {
        let request = synthesize(&classify("maximum temperature on 15 January 2010")).unwrap();
        let sql = request.to_sql();
        let year_pos = sql.find("strftime('%Y'").unwrap();
        let month_pos = sql.find("strftime('%m'").unwrap();
        let day_pos = sql.find("strftime('%d'").unwrap();
        assert!(year_pos < month_pos && month_pos < day_pos);
        assert_eq!(sql.matches(" AND ").count(), 3); // null check + 3 groups - 1
    }

    #[test]
    fn test_maximum_selects_owning_row_context() {
        let request = synthesize(&classify("maximum temperature")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("m.temperature AS max_temperature"));
        assert!(sql.contains("m.time, m.lat, m.lon, m.depth, m.float_id"));
        assert!(sql.contains("ORDER BY m.temperature DESC"));
        assert!(sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn test_minimum_orders_ascending() {
        let request = synthesize(&classify("minimum salinity")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("m.salinity AS min_salinity"));
        assert!(sql.contains("ORDER BY m.salinity ASC"));
    }

    #[test]
    fn test_extreme_default_parameter_policy() {
        // No explicit parameter: temperature
        let request = synthesize(&classify("what was the highest reading in the sea")).unwrap();
        assert_eq!(
            request.shape,
            QueryShape::Extreme {
                parameter: Parameter::Temperature,
                direction: Direction::Max,
            }
        );

        // Salinity alone requested: salinity
        let request = synthesize(&classify("maximum salinity")).unwrap();
        assert!(matches!(
            request.shape,
            QueryShape::Extreme {
                parameter: Parameter::Salinity,
                ..
            }
        ));

        // Both requested: temperature wins
        let request = synthesize(&classify("maximum salinity and temperature")).unwrap();
        assert!(matches!(
            request.shape,
            QueryShape::Extreme {
                parameter: Parameter::Temperature,
                ..
            }
        ));
    }

    #[test]
    fn test_count_shape() {
        let request = synthesize(&classify("how many measurements in 2011")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("COUNT(*) AS total_measurements"));
        assert!(sql.contains("COUNT(DISTINCT m.float_id) AS total_floats"));
        assert!(sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn test_trend_groups_by_year_month() {
        let request = synthesize(&classify("temperature trend over time")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("GROUP BY year, month"));
        assert!(sql.contains("ORDER BY year, month"));
        assert!(sql.ends_with("LIMIT 12"));
    }

    #[test]
    fn test_listing_shape_for_general() {
        let request = synthesize(&classify("measurements in the indian ocean")).unwrap();
        let sql = request.to_sql();
        assert!(sql.contains("ORDER BY m.time DESC"));
        assert!(sql.contains("f.wmo_id"));
        assert!(sql.ends_with("LIMIT 10"));
    }
}
