//! Error types shared by the core and its collaborators.
//!
//! Each failure source has its own enum so callers can tell input
//! validation, extraction, and synthesis failures apart.

use thiserror::Error;

/// Invalid chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap ({overlap}) must be less than chunk_size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },
}

/// Failure to turn a document's bytes into plain text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document's format is not one the extractor handles.
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("document is not valid UTF-8 text: {0}")]
    Encoding(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// The extraction task stopped before producing text.
    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Failure reported by an answer-synthesis provider.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Synthesis is switched off in configuration.
    #[error("answer synthesis is disabled")]
    Disabled,

    /// The provider needs an API key and none was configured.
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("synthesis request failed: {0}")]
    Http(String),

    /// The provider answered with a non-success status (quota, auth, ...).
    #[error("synthesis provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed synthesis response: {0}")]
    MalformedResponse(String),
}

/// Failure reported by an embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: String },

    #[error("embedding request failed: {0}")]
    Http(String),

    #[error("embedding provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// The provider returned a different number of vectors than inputs.
    #[error("expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}
