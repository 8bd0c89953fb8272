//! Lexical relevance retrieval over a pooled chunk list.
//!
//! Every chunk is scored against the question with cosine similarity over
//! sparse term vectors, ranked by `(score desc, pool index asc)`, and the
//! top `top_k` chunks are joined into one context string in ranked order.
//!
//! # Scoring Algorithm
//!
//! 1. Tokenize: lowercase, split on every non-alphanumeric character.
//! 2. Build a term vector per text. Weights are raw counts
//!    ([`Weighting::TermFrequency`]) or counts × smoothed IDF over the pool
//!    ([`Weighting::TfIdf`]): `idf = ln((1 + N) / (1 + df)) + 1`.
//! 3. `score = (q · c) / (‖q‖ × ‖c‖)`, or `0.0` if either vector is empty.
//! 4. Sort by score (desc), then pool index (asc).
//! 5. Truncate to `top_k`.
//!
//! Term vectors are `BTreeMap`s, so sums run in a fixed order and the
//! same inputs always produce bit-identical scores.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::retrieve::retrieve_relevant_chunks;
//!
//! let chunks = ["apple pie recipe", "car engine repair", "apple tree care"];
//! let context = retrieve_relevant_chunks("apple", &chunks, 2);
//! assert_eq!(context, "apple pie recipe\n\napple tree care");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::context::join_ranked;

type TermVector = BTreeMap<String, f64>;

/// How term vectors are weighted before the cosine is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weighting {
    /// Raw term counts.
    #[default]
    #[serde(rename = "tf")]
    TermFrequency,
    /// Term counts scaled by inverse document frequency across the pool.
    #[serde(rename = "tfidf", alias = "tf-idf")]
    TfIdf,
}

impl Weighting {
    /// Parse `tf`, `tfidf`, or `tf-idf`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tf" => Some(Self::TermFrequency),
            "tfidf" | "tf-idf" => Some(Self::TfIdf),
            _ => None,
        }
    }
}

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalParams {
    /// Maximum number of chunks in the context.
    pub top_k: usize,
    pub weighting: Weighting,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            weighting: Weighting::TermFrequency,
        }
    }
}

/// A chunk's position in the pool and its relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedChunk {
    /// Index into the pooled chunk list.
    pub index: usize,
    pub score: f64,
}

/// Stateless retriever bundling its parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Retriever {
    pub params: RetrievalParams,
}

impl Retriever {
    pub fn new(params: RetrievalParams) -> Self {
        Self { params }
    }

    /// Rank every chunk; the result covers the whole pool.
    pub fn rank<S: AsRef<str>>(&self, question: &str, chunks: &[S]) -> Vec<RankedChunk> {
        rank_chunks(question, chunks, self.params.weighting)
    }

    /// The best `top_k` chunks in ranked order. Empty when `chunks` is
    /// empty or `top_k` is zero.
    pub fn top<S: AsRef<str>>(&self, question: &str, chunks: &[S]) -> Vec<RankedChunk> {
        if chunks.is_empty() || self.params.top_k == 0 {
            return Vec::new();
        }
        let mut ranked = self.rank(question, chunks);
        ranked.truncate(self.params.top_k);
        ranked
    }

    /// Build the context string for `question` from the top chunks.
    pub fn retrieve<S: AsRef<str>>(&self, question: &str, chunks: &[S]) -> String {
        let ranked = self.top(question, chunks);
        join_ranked(chunks, &ranked, self.params.top_k)
    }
}

/// Return the `top_k` chunks most relevant to `question`, joined by a blank
/// line in ranked order.
///
/// Returns an empty string when `chunks` is empty or `top_k` is zero. If
/// `top_k` exceeds the pool size every chunk is returned.
pub fn retrieve_relevant_chunks<S: AsRef<str>>(
    question: &str,
    chunks: &[S],
    top_k: usize,
) -> String {
    Retriever::new(RetrievalParams {
        top_k,
        weighting: Weighting::TermFrequency,
    })
    .retrieve(question, chunks)
}

/// Score and order every chunk by `(score desc, index asc)`.
pub fn rank_chunks<S: AsRef<str>>(
    question: &str,
    chunks: &[S],
    weighting: Weighting,
) -> Vec<RankedChunk> {
    rank_scores(&score_chunks(question, chunks, weighting))
}

/// Order arbitrary per-chunk scores by `(score desc, index asc)`.
///
/// `scores[i]` belongs to pool index `i`. Used for both lexical and
/// embedding scores so every mode shares one tie-break rule.
pub fn rank_scores(scores: &[f64]) -> Vec<RankedChunk> {
    let mut ranked: Vec<RankedChunk> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| RankedChunk { index, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked
}

/// Cosine similarity of `question` against each chunk, in pool order.
pub fn score_chunks<S: AsRef<str>>(question: &str, chunks: &[S], weighting: Weighting) -> Vec<f64> {
    let mut chunk_vecs: Vec<TermVector> = chunks.iter().map(|c| term_counts(c.as_ref())).collect();
    let mut query_vec = term_counts(question);

    if weighting == Weighting::TfIdf {
        let idf = inverse_document_frequencies(&chunk_vecs);
        let unseen = smoothed_idf(chunk_vecs.len(), 0);
        apply_idf(&mut query_vec, &idf, unseen);
        for v in &mut chunk_vecs {
            apply_idf(v, &idf, unseen);
        }
    }

    chunk_vecs
        .iter()
        .map(|cv| sparse_cosine(&query_vec, cv))
        .collect()
}

/// Lowercased alphanumeric runs of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn term_counts(text: &str) -> TermVector {
    let mut counts = TermVector::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0.0) += 1.0;
    }
    counts
}

fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

fn inverse_document_frequencies(vecs: &[TermVector]) -> BTreeMap<String, f64> {
    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for v in vecs {
        let terms: BTreeSet<&str> = v.keys().map(String::as_str).collect();
        for t in terms {
            *df.entry(t).or_insert(0) += 1;
        }
    }
    df.into_iter()
        .map(|(t, n)| (t.to_string(), smoothed_idf(vecs.len(), n)))
        .collect()
}

fn apply_idf(vec: &mut TermVector, idf: &BTreeMap<String, f64>, unseen: f64) {
    for (term, weight) in vec.iter_mut() {
        *weight *= idf.get(term).copied().unwrap_or(unseen);
    }
}

fn sparse_cosine(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(t, wa)| b.get(t).map(|wb| wa * wb))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom < f64::EPSILON {
        return 0.0;
    }
    dot / denom
}
