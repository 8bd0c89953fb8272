//! # docqa
//!
//! Ask questions about a set of documents.
//!
//! PDF, DOCX, and plain-text files are extracted to text, split into
//! overlapping character windows, and pooled. A question is scored against
//! every chunk, the best chunks are joined into a context block, and the
//! context plus question go to an answer-synthesis provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────┐   ┌────────────┐
//! │  Extract   │──▶│ Chunk + Pool │──▶│  Retrieve  │──▶│ Synthesize │
//! │ PDF/DOCX/  │   │ (docqa-core) │   │ tf / tfidf │   │  (OpenAI)  │
//! │   text     │   └──────────────┘   │ / semantic │   └────────────┘
//! └────────────┘                      └────────────┘
//! ```
//!
//! The pure pieces (chunking, scoring, context assembly, collaborator
//! traits) live in [`docqa_core`]. This crate adds file extraction, the
//! HTTP providers, configuration, and the CLI commands.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | PDF, DOCX, and plain-text extraction |
//! | [`ingest`] | Path discovery, extraction, and pooling |
//! | [`ask`] | Question-answering session over one pool |
//! | [`synthesis`] | Answer-synthesis providers |
//! | [`embedding`] | Embedding provider for semantic retrieval |
//! | [`commands`] | CLI command implementations |

pub mod ask;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod synthesis;
