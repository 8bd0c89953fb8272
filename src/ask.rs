//! Question answering over one session's chunk pool.
//!
//! A [`QaSession`] owns a pool snapshot plus the injected collaborators.
//! It validates the question, retrieves context, and hands both to the
//! [`AnswerSynthesizer`]. Synthesis is skipped when no documents were
//! pooled.

use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use docqa_core::context::{join_ranked, join_ranked_attributed};
use docqa_core::embedding::{rank_by_embedding, EmbeddingProvider};
use docqa_core::{
    AnswerSynthesizer, ChunkPool, EmbeddingError, RankedChunk, Retriever, SynthesisError,
};

use crate::config::{RetrievalConfig, RetrievalMode};
use crate::embedding::embed_all;

/// Failures while answering a question. Each source keeps its own variant.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("semantic retrieval requires an embedding provider")]
    NoEmbedder,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// One retrieved chunk with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub rank: usize,
    pub index: usize,
    pub score: f64,
    pub document: String,
    pub text: String,
}

/// Ranked top-K chunks and the context string built from them.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    pub ranked: Vec<RankedChunk>,
    pub context: String,
}

#[derive(Debug, Clone)]
pub enum Answer {
    /// The pool is empty; synthesis was not attempted.
    NoDocuments,
    Answered { text: String, retrieval: Retrieval },
}

pub struct QaSession {
    pool: ChunkPool,
    retrieval: RetrievalConfig,
    retriever: Retriever,
    synthesizer: Box<dyn AnswerSynthesizer>,
    embedder: Option<Box<dyn EmbeddingProvider>>,
    embedding_batch_size: usize,
    chunk_vectors: OnceCell<Vec<Vec<f32>>>,
}

impl QaSession {
    pub fn new(
        pool: ChunkPool,
        retrieval: RetrievalConfig,
        synthesizer: Box<dyn AnswerSynthesizer>,
    ) -> Self {
        Self {
            pool,
            retriever: Retriever::new(retrieval.params()),
            retrieval,
            synthesizer,
            embedder: None,
            embedding_batch_size: 64,
            chunk_vectors: OnceCell::new(),
        }
    }

    /// Attach the embedding provider used when `retrieval.mode = "semantic"`.
    pub fn with_embedder(
        mut self,
        embedder: Box<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> Self {
        self.embedder = Some(embedder);
        self.embedding_batch_size = batch_size;
        self
    }

    pub fn pool(&self) -> &ChunkPool {
        &self.pool
    }

    /// Rank the pool against `question` and build the context string.
    ///
    /// An empty question is accepted here and yields a best-effort context.
    pub async fn retrieve(&self, question: &str) -> Result<Retrieval, AskError> {
        let top_k = self.retriever.params.top_k;
        if self.pool.is_empty() || top_k == 0 {
            return Ok(Retrieval::default());
        }

        let started = Instant::now();
        let ranked = match self.retrieval.mode {
            RetrievalMode::Lexical => self.retriever.top(question, self.pool.texts()),
            RetrievalMode::Semantic => {
                let mut ranked = self.rank_semantic(question).await?;
                ranked.truncate(top_k);
                ranked
            }
        };

        let context = if self.retrieval.attribute_sources {
            join_ranked_attributed(&self.pool, &ranked, top_k)
        } else {
            join_ranked(self.pool.texts(), &ranked, top_k)
        };

        debug!(
            mode = ?self.retrieval.mode,
            pool = self.pool.len(),
            top_k,
            returned = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieved context"
        );
        Ok(Retrieval { ranked, context })
    }

    async fn rank_semantic(&self, question: &str) -> Result<Vec<RankedChunk>, AskError> {
        let embedder = self.embedder.as_deref().ok_or(AskError::NoEmbedder)?;
        let chunk_vecs = self
            .chunk_vectors
            .get_or_try_init(|| async {
                info!(
                    chunks = self.pool.len(),
                    model = embedder.model_name(),
                    "embedding chunk pool"
                );
                embed_all(embedder, self.pool.texts(), self.embedding_batch_size).await
            })
            .await?;
        let query = embedder
            .embed(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            })?;
        Ok(rank_by_embedding(&query, chunk_vecs))
    }

    /// Turn ranked chunks into [`Hit`]s with document names and text.
    pub fn hits(&self, retrieval: &Retrieval) -> Vec<Hit> {
        retrieval
            .ranked
            .iter()
            .enumerate()
            .filter_map(|(rank, r)| {
                Some(Hit {
                    rank: rank + 1,
                    index: r.index,
                    score: r.score,
                    document: self.pool.document_of(r.index)?.to_string(),
                    text: self.pool.get(r.index)?.to_string(),
                })
            })
            .collect()
    }

    /// Answer `question` from the pool.
    ///
    /// # Errors
    ///
    /// - [`AskError::EmptyQuestion`] for blank questions.
    /// - [`AskError::Synthesis`] when the provider fails; not retried here.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        if question.trim().is_empty() {
            return Err(AskError::EmptyQuestion);
        }
        if self.pool.is_empty() {
            info!("no documents available; skipping synthesis");
            return Ok(Answer::NoDocuments);
        }

        let retrieval = self.retrieve(question).await?;
        let started = Instant::now();
        let text = self
            .synthesizer
            .synthesize(question, &retrieval.context)
            .await?;
        info!(
            provider = self.synthesizer.name(),
            context_chars = retrieval.context.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answer synthesized"
        );
        Ok(Answer::Answered { text, retrieval })
    }
}
