//! Context retriever - intent-sharpened similarity search
//!
//! Augments the raw query with an explicit restatement of the intent's
//! temporal and parameter constraints before embedding; short queries
//! like "average temperature" carry little signal on their own. All
//! failures degrade to empty results - callers treat empty as "no
//! context", never as an error. Embedding and index search run on a
//! worker thread under the same deadline discipline as the query
//! executor; a deadline overrun counts as the index being unavailable.

use log::warn;
use parking_lot::Mutex;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use super::document::DocMetadata;
use super::store::{DocumentIndex, MetadataFilter};
use crate::embeddings::Embedder;
use crate::intent::{month_name, Intent};

/// Read-only retrieval over the document index
pub struct ContextRetriever {
    index: Arc<DocumentIndex>,
    embedder: Arc<Mutex<Box<dyn Embedder>>>,
}

impl ContextRetriever {
    pub fn new(index: Arc<DocumentIndex>, embedder: Arc<Mutex<Box<dyn Embedder>>>) -> Self {
        Self { index, embedder }
    }

    /// Retrieve the k most relevant documents and their metadata
    ///
    /// Temporal intent adds a year/month metadata filter so exact
    /// matches rank above purely semantic ones. A retrieval that does
    /// not finish within `timeout` yields empty results; the straggler
    /// finishes in the background and is discarded.
    pub fn retrieve(
        &self,
        text: &str,
        intent: &Intent,
        k: usize,
        timeout: Duration,
    ) -> (Vec<String>, Vec<DocMetadata>) {
        let query = augment_query(text, intent);

        let filter = MetadataFilter {
            years: intent.temporal.years.clone(),
            months: intent.temporal.months.clone(),
        };
        let filter = (!filter.is_empty()).then_some(filter);

        let index = Arc::clone(&self.index);
        let embedder = Arc::clone(&self.embedder);
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let _ = tx.send(run_retrieval(&index, &embedder, &query, filter.as_ref(), k));
        });

        match rx.recv_timeout(timeout) {
            Ok(results) => results,
            Err(_) => {
                warn!("context retrieval timed out after {timeout:?}");
                (Vec::new(), Vec::new())
            }
        }
    }
}

fn run_retrieval(
    index: &DocumentIndex,
    embedder: &Mutex<Box<dyn Embedder>>,
    query: &str,
    filter: Option<&MetadataFilter>,
    k: usize,
) -> (Vec<String>, Vec<DocMetadata>) {
    let embedding = {
        let mut embedder = embedder.lock();
        match embedder.embed(query) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("context retrieval skipped, embedding failed: {e:#}");
                return (Vec::new(), Vec::new());
            }
        }
    };

    match index.search(&embedding, filter, k) {
        Ok(results) => results.into_iter().unzip(),
        Err(e) => {
            warn!("context retrieval failed: {e:#}");
            (Vec::new(), Vec::new())
        }
    }
}

/// Restate intent constraints into the similarity query text
pub fn augment_query(text: &str, intent: &Intent) -> String {
    let mut query = text.to_string();

    if !intent.temporal.years.is_empty() {
        let years: Vec<String> = intent.temporal.years.iter().map(|y| y.to_string()).collect();
        query.push_str(&format!(" in {}", years.join(" ")));
    }
    if !intent.temporal.months.is_empty() {
        let months: Vec<&str> = intent
            .temporal
            .months
            .iter()
            .map(|&m| month_name(m))
            .collect();
        query.push_str(&format!(" during {}", months.join(" ")));
    }
    if !intent.parameters.is_empty() {
        let params: Vec<&str> = intent.parameters.iter().map(|p| p.column()).collect();
        query.push_str(&format!(" {} measurements", params.join(" ")));
    }

    query
}
