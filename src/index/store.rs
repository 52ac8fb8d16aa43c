//! Document index - SQLite + USearch hybrid storage for evidence documents
//!
//! SQLite holds the source of truth (document prose, metadata JSON).
//! USearch provides vector similarity search via an HNSW index keyed by
//! rowid. Metadata filters are applied post-search by over-fetching.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::document::DocMetadata;

const INITIAL_CAPACITY: usize = 1000;
// Over-fetch multiplier when a metadata filter narrows results
const FILTER_OVERFETCH: usize = 3;

/// Equality/membership predicates over document metadata
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
}

impl MetadataFilter {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.months.is_empty()
    }

    fn matches(&self, metadata: &DocMetadata) -> bool {
        if !self.years.is_empty() {
            match metadata.year {
                Some(year) if self.years.contains(&year) => {}
                _ => return false,
            }
        }
        if !self.months.is_empty() {
            match metadata.month {
                Some(month) if self.months.contains(&month) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Dual storage for evidence documents: SQLite + USearch
pub struct DocumentIndex {
    vectors: Index,
    db: Mutex<Connection>,
    index_path: PathBuf,
}

impl DocumentIndex {
    /// Open or create the document index at the given directory
    ///
    /// Creates two files:
    /// - `{path}/documents.db` - SQLite database
    /// - `{path}/documents.usearch` - USearch vector index
    pub fn open<P: AsRef<Path>>(path: P, dimensions: usize) -> Result<Self> {
        let base = path.as_ref();
        std::fs::create_dir_all(base)?;

        let db_path = base.join("documents.db");
        let db = Connection::open(&db_path).context("Failed to open document database")?;
        Self::init_schema(&db)?;

        let options = IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            ..Default::default()
        };
        let index = Index::new(&options).context("Failed to create USearch index")?;
        index.reserve(INITIAL_CAPACITY)?;

        let index_path = base.join("documents.usearch");
        if index_path.exists() {
            index
                .load(index_path.to_str().unwrap_or(""))
                .context("Failed to load existing USearch index")?;
        }

        Ok(Self {
            vectors: index,
            db: Mutex::new(db),
            index_path,
        })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                rowid INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a document with its embedding (ingestion/seeding only)
    pub fn insert(
        &self,
        content: &str,
        metadata: &DocMetadata,
        embedding: &[f32],
    ) -> Result<()> {
        let metadata_json = serde_json::to_string(metadata)?;
        let rowid: i64 = {
            let db = self.db.lock();
            db.query_row(
                "INSERT INTO documents (content, metadata) VALUES (?1, ?2) RETURNING rowid",
                params![content, metadata_json],
                |row| row.get(0),
            )?
        };

        if self.vectors.size() + 1 > self.vectors.capacity() {
            self.vectors.reserve(self.vectors.capacity() * 2)?;
        }
        self.vectors
            .add(rowid as u64, embedding)
            .context("Failed to add vector to USearch index")?;

        Ok(())
    }

    /// Search for the most similar documents, optionally metadata-filtered
    ///
    /// With a filter, over-fetches then post-filters so exact temporal
    /// matches are preferred over purely semantic ones.
    pub fn search(
        &self,
        embedding: &[f32],
        filter: Option<&MetadataFilter>,
        limit: usize,
    ) -> Result<Vec<(String, DocMetadata)>> {
        let filter = filter.filter(|f| !f.is_empty());
        let fetch = match filter {
            Some(_) => limit * FILTER_OVERFETCH,
            None => limit,
        };

        let matches = self
            .vectors
            .search(embedding, fetch)
            .context("Failed to search USearch index")?;

        let mut results = Vec::new();
        for rowid in matches.keys {
            if let Some((content, metadata)) = self.load_by_rowid(rowid as i64)? {
                if filter.map_or(true, |f| f.matches(&metadata)) {
                    results.push((content, metadata));
                    if results.len() >= limit {
                        break;
                    }
                }
            }
        }

        Ok(results)
    }

    fn load_by_rowid(&self, rowid: i64) -> Result<Option<(String, DocMetadata)>> {
        let db = self.db.lock();
        let result = db.query_row(
            "SELECT content, metadata FROM documents WHERE rowid = ?1",
            params![rowid],
            |row| {
                let content: String = row.get(0)?;
                let metadata_str: String = row.get(1)?;
                Ok((content, metadata_str))
            },
        );

        match result {
            Ok((content, metadata_str)) => {
                let metadata: DocMetadata =
                    serde_json::from_str(&metadata_str).unwrap_or_default();
                Ok(Some((content, metadata)))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the USearch index to disk
    pub fn save(&self) -> Result<()> {
        self.vectors
            .save(self.index_path.to_str().unwrap_or(""))
            .context("Failed to save USearch index")?;
        Ok(())
    }

    /// Number of indexed documents
    pub fn count(&self) -> Result<usize> {
        let db = self.db.lock();
        let count: i64 = db.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
