//! Evidence document index and context retrieval
//!
//! Documents are prose summaries of sampled measurements, indexed for
//! vector similarity with typed metadata alongside. The index is
//! populated by the ingestion collaborator (or the seeding tool) and
//! read-only from the engine's perspective.

mod document;
mod retriever;
mod store;

pub use document::{render_document, DocMetadata};
pub use retriever::{augment_query, ContextRetriever};
pub use store::{DocumentIndex, MetadataFilter};
