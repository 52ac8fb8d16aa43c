//! Query synthesis and execution
//!
//! `synthesize` maps an intent to one bounded aggregation request from a
//! small fixed catalogue of shapes; `execute` runs it against the store
//! with a deadline and normalizes rows into a canonical representation.
//! No free-form SQL ever reaches the store.

mod executor;
mod request;

pub use executor::{execute, QueryResult, Row, Scalar};
pub use request::{synthesize, Direction, QueryRequest, QueryShape};
