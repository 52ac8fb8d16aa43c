//! Argonaut - grounded question answering over ARGO float measurements
//!
//! One deterministic engine answers free-text questions about a fixed
//! oceanographic dataset by combining semantic retrieval over indexed
//! measurement summaries with a bounded aggregation query against the
//! structured store, then fusing both into a natural-language answer.
//!
//! Pipeline per request:
//!
//! ```text
//! text -> classify -> { retrieve context | synthesize + execute } -> compose
//! ```
//!
//! The retrieval and query paths are independent and run in parallel.
//! Every external collaborator failure is absorbed at its component
//! boundary; `answer_query` always returns a polite answer.

pub mod config;
pub mod embeddings;
pub mod engine;
pub mod index;
pub mod intent;
pub mod query;
pub mod respond;
pub mod seed;
pub mod store;

pub use config::EngineConfig;
pub use engine::{answer_query, Answer, AnswerEngine, EngineContext};
pub use intent::{classify, Intent, IntentKind, Parameter};
