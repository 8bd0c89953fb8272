//! # docqa CLI
//!
//! ## Usage
//!
//! ```bash
//! docqa [--config ./docqa.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa ask "<question>" <paths>...` | Answer a question from the documents |
//! | `docqa retrieve "<question>" <paths>...` | Print the retrieved context without synthesis |
//! | `docqa chunk <paths>...` | Show extracted text previews and chunk counts |
//! | `docqa chat <paths>...` | Pool once, then answer questions from stdin |
//!
//! ## Examples
//!
//! ```bash
//! # One-shot question over a folder of manuals
//! OPENAI_API_KEY=sk-... docqa ask "How do I reset the device?" ./manuals
//!
//! # Inspect what retrieval would send, ranked, as JSON
//! docqa retrieve "reset procedure" report.pdf notes.txt --top-k 3 --json
//!
//! # Smaller chunks with TF-IDF weighting
//! docqa retrieve "warranty" ./docs --chunk-size 400 --overlap 50 --weighting tfidf
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docqa::commands;
use docqa::config::{self, Config};
use docqa_core::Weighting;

/// Question answering over your own documents.
#[derive(Parser)]
#[command(
    name = "docqa",
    about = "Ask questions about PDF, DOCX, and text documents",
    version,
    long_about = "docqa extracts text from the given documents, splits it into overlapping \
    chunks, retrieves the chunks most similar to your question, and asks a language model \
    to answer from that context alone."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by every command that retrieves.
#[derive(clap::Args, Default)]
struct RetrievalArgs {
    /// Number of chunks placed in the context.
    #[arg(long)]
    top_k: Option<usize>,

    /// Maximum characters per chunk.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks.
    #[arg(long)]
    overlap: Option<usize>,

    /// Term weighting: `tf` or `tfidf`.
    #[arg(long, value_parser = parse_weighting)]
    weighting: Option<Weighting>,

    /// Prefix each context chunk with `[source: <document>]`.
    #[arg(long)]
    sources: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the given documents.
    Ask {
        /// The question to answer.
        question: String,

        /// Files or directories to read.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// Print the retrieved context before the answer.
        #[arg(long)]
        show_context: bool,
    },

    /// Print the context that would be sent for a question.
    ///
    /// Runs extraction and retrieval only; no API key is needed in
    /// lexical mode.
    Retrieve {
        question: String,

        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// Print ranked hits with scores as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract and chunk documents, printing a preview of each.
    Chunk {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        chunk_size: Option<usize>,

        #[arg(long)]
        overlap: Option<usize>,

        /// Print every chunk as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Pool the documents once and answer questions read from stdin.
    ///
    /// `exit` or `quit` ends the session.
    Chat {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        #[arg(long)]
        show_context: bool,
    },
}

/// Same names as the `retrieval.weighting` config key.
fn parse_weighting(s: &str) -> Result<Weighting, String> {
    Weighting::from_name(s)
        .ok_or_else(|| format!("unknown weighting '{}': expected tf or tfidf", s))
}

fn apply_chunking(cfg: &mut Config, chunk_size: Option<usize>, overlap: Option<usize>) {
    if let Some(size) = chunk_size {
        cfg.chunking.chunk_size = size;
    }
    if let Some(overlap) = overlap {
        cfg.chunking.overlap = overlap;
    }
}

impl RetrievalArgs {
    fn apply(self, cfg: &mut Config) {
        apply_chunking(cfg, self.chunk_size, self.overlap);
        if let Some(k) = self.top_k {
            cfg.retrieval.top_k = k;
        }
        if let Some(w) = self.weighting {
            cfg.retrieval.weighting = w;
        }
        if self.sources {
            cfg.retrieval.attribute_sources = true;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "docqa=debug" } else { "docqa=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Ask {
            question,
            paths,
            retrieval,
            show_context,
        } => {
            retrieval.apply(&mut cfg);
            cfg.validate()?;
            commands::run_ask(&cfg, &question, &paths, show_context).await?;
        }
        Commands::Retrieve {
            question,
            paths,
            retrieval,
            json,
        } => {
            retrieval.apply(&mut cfg);
            cfg.validate()?;
            commands::run_retrieve(&cfg, &question, &paths, json).await?;
        }
        Commands::Chunk {
            paths,
            chunk_size,
            overlap,
            json,
        } => {
            apply_chunking(&mut cfg, chunk_size, overlap);
            cfg.validate()?;
            commands::run_chunk(&cfg, &paths, json).await?;
        }
        Commands::Chat {
            paths,
            retrieval,
            show_context,
        } => {
            retrieval.apply(&mut cfg);
            cfg.validate()?;
            commands::run_chat(&cfg, &paths, show_context).await?;
        }
    }

    Ok(())
}
