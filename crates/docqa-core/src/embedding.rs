//! Embedding provider trait and dense-vector scoring.
//!
//! The [`EmbeddingProvider`] trait is the seam for semantic retrieval.
//! Concrete providers (OpenAI) live in the `docqa` app crate; this module
//! only holds the trait and the similarity math, which ranks through the
//! same [`rank_scores`](crate::retrieve::rank_scores) tie-break as lexical
//! retrieval.

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::retrieve::{rank_scores, RankedChunk};

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Rank chunk embeddings against a query embedding.
pub fn rank_by_embedding(query: &[f32], chunk_vecs: &[Vec<f32>]) -> Vec<RankedChunk> {
    let scores: Vec<f64> = chunk_vecs
        .iter()
        .map(|v| cosine_similarity(query, v) as f64)
        .collect();
    rank_scores(&scores)
}
