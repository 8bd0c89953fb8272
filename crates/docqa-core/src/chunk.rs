//! Sliding-window text chunker.
//!
//! Splits one document's plain text into fixed-size character windows that
//! overlap their predecessor by `overlap` characters. Windows are measured
//! in Unicode scalar values, so multi-byte text is never cut inside a
//! character. The chunker is not aware of words or sentences and may split
//! a word across two windows.
//!
//! # Algorithm
//!
//! 1. Validate `chunk_size > 0` and `overlap < chunk_size`.
//! 2. Window `i` starts at character `i × (chunk_size − overlap)`.
//! 3. Each window spans up to `chunk_size` characters.
//! 4. Stop after the first window that reaches the end of the text.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("abcdefghij", 4, 1).unwrap();
//! assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
//! ```

use crate::error::ChunkError;

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkParams {
    /// Validate and build chunking parameters.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::ZeroChunkSize`] if `chunk_size == 0`.
    /// - [`ChunkError::OverlapTooLarge`] if `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ChunkError::OverlapTooLarge {
                overlap,
                chunk_size,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance in characters between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` with these parameters. See [`chunk_text`].
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offset of every char start, plus the end of the text, so any
        // character range maps to a valid `&str` slice.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(text[bounds[start]..bounds[end]].to_string());
            if end == char_count {
                break;
            }
            start += self.stride();
        }
        chunks
    }
}

/// Split `text` into overlapping windows of at most `chunk_size` characters.
///
/// # Guarantees
///
/// - Empty text yields no chunks.
/// - Text of at most `chunk_size` characters yields exactly one chunk.
/// - Chunk `i + 1` starts `chunk_size − overlap` characters after chunk `i`
///   and begins with chunk `i`'s final `overlap` characters.
/// - The first chunk followed by every later chunk minus its leading
///   `overlap` characters reconstructs `text`.
///
/// # Errors
///
/// Fails fast on invalid parameters; values are never clamped.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkError> {
    Ok(ChunkParams::new(chunk_size, overlap)?.split(text))
}
