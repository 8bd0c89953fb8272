//! Ordered pool of chunks across every document in a session.
//!
//! A [`ChunkPool`] is built from per-document chunk sequences in upload
//! order. Retrieval only sees the flat text list, while the recorded
//! document spans let a pool index be traced back to its source.

use serde::Serialize;

/// The contiguous range of pool indices contributed by one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSpan {
    pub name: String,
    /// Pool index of the document's first chunk.
    pub start: usize,
    /// Number of chunks the document contributed (may be zero).
    pub len: usize,
}

/// Flattened chunk list with document boundaries.
#[derive(Debug, Clone, Default)]
pub struct ChunkPool {
    chunks: Vec<String>,
    documents: Vec<DocumentSpan>,
}

impl ChunkPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from `(name, chunks)` pairs, keeping their order.
    pub fn from_documents<I, N>(documents: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<String>)>,
        N: Into<String>,
    {
        let mut pool = Self::new();
        for (name, chunks) in documents {
            pool.push_document(name, chunks);
        }
        pool
    }

    /// Append one document's chunks after everything already pooled.
    pub fn push_document(&mut self, name: impl Into<String>, chunks: Vec<String>) {
        self.documents.push(DocumentSpan {
            name: name.into(),
            start: self.chunks.len(),
            len: chunks.len(),
        });
        self.chunks.extend(chunks);
    }

    /// The pooled chunk texts in pool order.
    pub fn texts(&self) -> &[String] {
        &self.chunks
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn documents(&self) -> &[DocumentSpan] {
        &self.documents
    }

    /// Name of the document that contributed the chunk at `index`.
    pub fn document_of(&self, index: usize) -> Option<&str> {
        if index >= self.chunks.len() {
            return None;
        }
        // Spans are sorted by `start`; pick the last non-empty one that
        // begins at or before `index`.
        let pos = self.documents.partition_point(|d| d.start <= index);
        self.documents[..pos]
            .iter()
            .rev()
            .find(|d| d.len > 0)
            .map(|d| d.name.as_str())
    }
}
