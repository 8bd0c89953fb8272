//! Collaborator traits for extraction and answer synthesis.
//!
//! The core never performs I/O. The application supplies implementations
//! of these traits; tests supply stubs.

use async_trait::async_trait;

use crate::error::{ExtractError, SynthesisError};

/// Converts one document's raw bytes into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract text from `bytes`. `name` identifies the document (usually
    /// its file name) and may be used to pick a format.
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Produces a natural-language answer from a question and its context.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Short provider identifier used in logs (e.g. `"openai"`).
    fn name(&self) -> &str;

    async fn synthesize(&self, question: &str, context: &str) -> Result<String, SynthesisError>;
}
