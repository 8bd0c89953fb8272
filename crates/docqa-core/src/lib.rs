//! # docqa Core
//!
//! Pure retrieval logic for docqa: character-window chunking, chunk
//! pooling, lexical scoring and ranking, context assembly, and the traits
//! through which extraction, synthesis, and embedding collaborators plug in.
//!
//! This crate performs no network or filesystem I/O.
//!
//! ```rust
//! use docqa_core::chunk::chunk_text;
//! use docqa_core::pool::ChunkPool;
//! use docqa_core::retrieve::retrieve_relevant_chunks;
//!
//! let mut pool = ChunkPool::new();
//! pool.push_document("fruit.txt", chunk_text("apples grow on trees", 1000, 200).unwrap());
//! pool.push_document("cars.txt", chunk_text("engines need oil", 1000, 200).unwrap());
//!
//! let context = retrieve_relevant_chunks("where do apples grow?", pool.texts(), 1);
//! assert_eq!(context, "apples grow on trees");
//! ```

pub mod chunk;
pub mod context;
pub mod embedding;
pub mod error;
pub mod pool;
pub mod provider;
pub mod retrieve;

pub use chunk::{chunk_text, ChunkParams};
pub use error::{ChunkError, EmbeddingError, ExtractError, SynthesisError};
pub use pool::ChunkPool;
pub use provider::{AnswerSynthesizer, TextExtractor};
pub use retrieve::{retrieve_relevant_chunks, RankedChunk, RetrievalParams, Retriever, Weighting};
