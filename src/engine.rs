//! Answer engine - one call from free text to a grounded answer
//!
//! Wires the classifier, retriever, synthesizer, executor, and composer
//! together. Retrieval and query execution are independent and run in
//! parallel; greetings and out-of-scope questions short-circuit past
//! both. Engine state is built once and reused across requests.

use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

use crate::config::EngineConfig;
use crate::embeddings::{Embedder, OnnxEmbedder};
use crate::index::{ContextRetriever, DocMetadata, DocumentIndex};
use crate::intent::{classify, IntentKind};
use crate::query::{execute, synthesize, QueryResult};
use crate::respond::{Composer, FixedTemplates, TemplateRenderer};
use crate::store::{DatasetCoverage, MeasurementStore};

/// Everything the engine needs, opened once
pub struct EngineContext {
    pub store: Arc<MeasurementStore>,
    pub index: Arc<DocumentIndex>,
    pub embedder: Arc<Mutex<Box<dyn Embedder>>>,
    pub config: EngineConfig,
}

impl EngineContext {
    /// Open store, index, and embedding model from configuration
    pub fn initialize(config: EngineConfig) -> Result<Self> {
        let store = Arc::new(
            MeasurementStore::open(config.measurements_db())
                .context("Failed to open measurement store")?,
        );
        let index = Arc::new(
            DocumentIndex::open(config.index_dir(), config.embedding_dimensions)
                .context("Failed to open document index")?,
        );
        let embedder: Box<dyn Embedder> = Box::new(
            OnnxEmbedder::open(&config.model_dir())
                .context("Failed to load embedding model")?,
        );

        Ok(Self {
            store,
            index,
            embedder: Arc::new(Mutex::new(embedder)),
            config,
        })
    }
}

/// Complete answer bundle: text plus the evidence it was built from
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    /// Evidence documents retrieved for the query
    pub context_documents: Vec<String>,
    /// Metadata of the retrieved documents, JSON per document
    pub retrieved_metadata: Vec<serde_json::Value>,
    /// Normalized query result rows, JSON per row
    pub sql_results: Vec<serde_json::Value>,
}

impl Answer {
    fn text_only(answer: String) -> Self {
        Self {
            answer,
            context_documents: Vec::new(),
            retrieved_metadata: Vec::new(),
            sql_results: Vec::new(),
        }
    }
}

/// The question-answering engine
pub struct AnswerEngine {
    store: Arc<MeasurementStore>,
    retriever: ContextRetriever,
    composer: Composer,
    coverage: DatasetCoverage,
    config: EngineConfig,
}

impl AnswerEngine {
    /// Build the engine from an initialized context
    pub fn new(context: EngineContext) -> Result<Self> {
        Self::with_renderer(context, Box::new(FixedTemplates))
    }

    /// Build the engine with a custom phrasing backend
    pub fn with_renderer(
        context: EngineContext,
        renderer: Box<dyn TemplateRenderer>,
    ) -> Result<Self> {
        let coverage = context
            .store
            .coverage()
            .context("Failed to read dataset coverage")?;
        info!(
            "engine ready: {} measurements from {} floats, {} indexed documents",
            coverage.measurements,
            coverage.floats,
            context.index.count().unwrap_or(0)
        );

        Ok(Self {
            store: Arc::clone(&context.store),
            retriever: ContextRetriever::new(
                Arc::clone(&context.index),
                Arc::clone(&context.embedder),
            ),
            composer: Composer::new(renderer),
            coverage,
            config: context.config,
        })
    }

    /// Answer one free-text question
    ///
    /// Total and deterministic for fixed engine state: identical text
    /// yields an identical answer. Never returns an error to the caller;
    /// collaborator failures degrade to less-grounded answers.
    pub fn answer(&self, text: &str) -> Answer {
        let intent = classify(text);

        // Greetings and out-of-scope questions never touch store or index
        if matches!(intent.kind, IntentKind::Greeting | IntentKind::OutOfScope) {
            let answer = self.composer.compose(&intent, &[], None, &self.coverage);
            return Answer::text_only(answer);
        }

        let ((documents, metadata), result) = rayon::join(
            || {
                self.retriever
                    .retrieve(text, &intent, self.config.top_k, self.config.timeout())
            },
            || self.run_query(&intent),
        );

        let answer = self
            .composer
            .compose(&intent, &documents, result.as_ref(), &self.coverage);

        Answer {
            answer,
            retrieved_metadata: metadata
                .iter()
                .map(|m: &DocMetadata| serde_json::to_value(m).unwrap_or_default())
                .collect(),
            context_documents: documents,
            sql_results: result
                .map(|r| r.rows.iter().map(|row| row.to_json()).collect())
                .unwrap_or_default(),
        }
    }

    fn run_query(&self, intent: &crate::intent::Intent) -> Option<QueryResult> {
        let request = synthesize(intent)?;
        execute(&self.store, &request, self.config.timeout())
    }

    pub fn coverage(&self) -> &DatasetCoverage {
        &self.coverage
    }
}

static ENGINE: OnceLock<std::result::Result<AnswerEngine, String>> = OnceLock::new();

const ENGINE_UNAVAILABLE: &str = "I'm currently unable to access the ARGO float dataset. \
The engine could not be initialized; please check that the data directory has been \
seeded and the embedding model is present, then try again.";

/// Answer a question with the process-wide engine
///
/// The engine is initialized on first call and reused. If initialization
/// fails, the failure is remembered and never retried within the
/// process; calls degrade to [`degraded_answer`].
pub fn answer_query(text: &str) -> Answer {
    let engine = ENGINE.get_or_init(|| {
        EngineConfig::load()
            .and_then(AnswerEngine::from_config)
            .map_err(|e| format!("{e:#}"))
    });

    match engine {
        Ok(engine) => engine.answer(text),
        Err(e) => {
            warn!("engine unavailable: {e}");
            degraded_answer(text)
        }
    }
}

// Classification is total and the greeting/scope branches of the
// composer need no collaborators, so those answers survive a failed
// initialization; only data questions get the unavailable note.
fn degraded_answer(text: &str) -> Answer {
    let intent = classify(text);
    let answer = match intent.kind {
        IntentKind::Greeting | IntentKind::OutOfScope => Composer::new(Box::new(FixedTemplates))
            .compose(&intent, &[], None, &DatasetCoverage::default()),
        _ => ENGINE_UNAVAILABLE.to_string(),
    };
    Answer::text_only(answer)
}

impl AnswerEngine {
    fn from_config(config: EngineConfig) -> Result<Self> {
        Self::new(EngineContext::initialize(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_bundle_shapes() {
        let answer = Answer::text_only("hello".to_string());
        assert_eq!(answer.answer, "hello");
        assert!(answer.context_documents.is_empty());
        assert!(answer.sql_results.is_empty());
    }

    #[test]
    fn test_metadata_serializes_to_json() {
        let meta = DocMetadata {
            float_id: "F001".to_string(),
            year: Some(2010),
            ..DocMetadata::default()
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["float_id"], "F001");
        assert_eq!(value["year"], 2010);
    }

    #[test]
    fn test_degraded_greeting_still_introduces() {
        let answer = degraded_answer("Hello");
        assert!(answer.answer.starts_with("Hello!"));
        assert!(!answer.answer.contains("unable to access"));
        assert!(answer.context_documents.is_empty());
        assert!(answer.sql_results.is_empty());
    }

    #[test]
    fn test_degraded_out_of_scope_still_clarifies() {
        let answer = degraded_answer("What's the stock market doing?");
        assert!(answer
            .answer
            .contains("specialized in ARGO float oceanographic data"));
    }

    #[test]
    fn test_degraded_data_question_reports_unavailable() {
        let answer = degraded_answer("average temperature in 2010");
        assert!(answer.answer.contains("currently unable to access"));
    }
}
