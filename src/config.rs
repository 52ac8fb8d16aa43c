//! Engine configuration
//!
//! Defaults work out of the box; an optional `argonaut.toml` in the
//! data directory overrides individual fields. All paths derive from
//! `data_dir` so tests can point the whole engine at a temp directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::embeddings::DEFAULT_DIMENSIONS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root directory for database, index, and model files
    pub data_dir: PathBuf,
    /// Evidence documents retrieved per query
    pub top_k: usize,
    /// Upper bound on synthesized query execution, in milliseconds
    pub query_timeout_ms: u64,
    /// Embedding model identifier (documentation and status output)
    pub embedding_model: String,
    /// Embedding vector width
    pub embedding_dimensions: usize,
    /// Region label quoted in answers
    pub region: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            top_k: 5,
            query_timeout_ms: 5000,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            embedding_dimensions: DEFAULT_DIMENSIONS,
            region: "Indian Ocean".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration, applying `argonaut.toml` overrides if present
    pub fn load() -> Result<Self> {
        let config_path = default_data_dir().join("argonaut.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config at {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", config_path.display()))
    }

    /// Path to the measurement database
    pub fn measurements_db(&self) -> PathBuf {
        self.data_dir.join("measurements.db")
    }

    /// Directory holding the document index files
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Directory holding the ONNX model and tokenizer
    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(&self.embedding_model)
    }

    /// Query execution timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("argonaut")
}
