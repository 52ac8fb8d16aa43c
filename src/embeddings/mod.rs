//! Embeddings - text to fixed-length vectors for the document index
//!
//! Trait seam so the engine never depends on a concrete model; the
//! default backend runs all-MiniLM-L6-v2 through ONNX Runtime. Tests
//! inject deterministic stubs through the same trait.

mod onnx;

pub use onnx::OnnxEmbedder;

use anyhow::Result;

/// Embedding dimension of the default model (all-MiniLM-L6-v2)
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Trait for embedding generation backends
///
/// `Send` so the engine can move embedding work onto worker threads.
pub trait Embedder: Send {
    /// Generate an embedding for a single text
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Embedding dimension (e.g. 384 for all-MiniLM-L6-v2)
    fn dimensions(&self) -> usize;

    /// Model name for diagnostics
    fn model_name(&self) -> &str;
}

/// Cosine similarity between two vectors of equal length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = vec![0.5, 0.5, 0.0];
        assert_relative_eq!(cosine_similarity(&v, &v), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_relative_eq!(cosine_similarity(&a, &b), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_relative_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
