//! CLI command implementations.
//!
//! Each `run_*` function takes the loaded [`Config`] (with command-line
//! overrides already applied) and writes its result to stdout. Warnings
//! about skipped documents go to stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use docqa_core::AnswerSynthesizer;

use crate::ask::{Answer, AskError, QaSession};
use crate::config::{Config, RetrievalMode};
use crate::embedding::OpenAiEmbedder;
use crate::extract::FileExtractor;
use crate::ingest::{collect_inputs, ingest_paths, IngestReport};
use crate::synthesis::{create_synthesizer, DisabledSynthesizer};

/// Message printed when nothing could be pooled.
pub const NO_DOCUMENTS: &str = "No documents available.";

/// Discover, extract, and chunk the inputs, reporting skipped documents.
pub async fn load_pool(cfg: &Config, inputs: &[PathBuf]) -> Result<IngestReport> {
    let params = cfg.chunking.params()?;
    let files = collect_inputs(inputs)?;
    let report = ingest_paths(&files, Arc::new(FileExtractor), params).await;
    for failure in &report.failures {
        eprintln!("Warning: skipped {}: {}", failure.name, failure.error);
    }
    Ok(report)
}

/// Build a session. `synthesize = false` installs the disabled provider
/// so retrieval-only commands never need an API key.
fn build_session(cfg: &Config, report: IngestReport, synthesize: bool) -> Result<QaSession> {
    let api_key = cfg.resolve_api_key();

    let synthesizer: Box<dyn AnswerSynthesizer> = if synthesize {
        create_synthesizer(&cfg.synthesis, api_key.clone()).with_context(|| {
            format!(
                "Set synthesis.api_key or the {} environment variable",
                cfg.synthesis.api_key_env
            )
        })?
    } else {
        Box::new(DisabledSynthesizer)
    };

    let mut session = QaSession::new(report.pool, cfg.retrieval.clone(), synthesizer);

    if cfg.retrieval.mode == RetrievalMode::Semantic {
        let key = api_key.with_context(|| {
            format!(
                "Semantic retrieval needs an API key: set synthesis.api_key or {}",
                cfg.synthesis.api_key_env
            )
        })?;
        let embedder = OpenAiEmbedder::new(&cfg.embedding, &cfg.synthesis.base_url, key)?;
        session = session.with_embedder(Box::new(embedder), cfg.embedding.batch_size);
    }

    Ok(session)
}

/// `docqa ask`: answer one question.
pub async fn run_ask(
    cfg: &Config,
    question: &str,
    inputs: &[PathBuf],
    show_context: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Please enter a question.");
    }
    let report = load_pool(cfg, inputs).await?;
    if report.pool.is_empty() {
        println!("{}", NO_DOCUMENTS);
        return Ok(());
    }
    let session = build_session(cfg, report, true)?;
    answer_one(&session, question, show_context).await
}

async fn answer_one(session: &QaSession, question: &str, show_context: bool) -> Result<()> {
    match session.ask(question).await {
        Ok(Answer::NoDocuments) => println!("{}", NO_DOCUMENTS),
        Ok(Answer::Answered { text, retrieval }) => {
            if show_context {
                println!("--- context ---");
                println!("{}", retrieval.context);
                println!("--- answer ---");
            }
            println!("{}", text);
        }
        Err(AskError::Synthesis(e)) => {
            return Err(anyhow::Error::new(e).context("Answer synthesis failed"));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// `docqa retrieve`: print the context (or ranked hits as JSON) without synthesis.
pub async fn run_retrieve(
    cfg: &Config,
    question: &str,
    inputs: &[PathBuf],
    json: bool,
) -> Result<()> {
    let report = load_pool(cfg, inputs).await?;
    let session = build_session(cfg, report, false)?;
    let retrieval = session.retrieve(question).await?;

    if json {
        let hits = session.hits(&retrieval);
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if session.pool().is_empty() {
        eprintln!("{}", NO_DOCUMENTS);
    } else {
        println!("{}", retrieval.context);
    }
    Ok(())
}

#[derive(Serialize)]
struct ChunkDump<'a> {
    name: &'a str,
    char_count: usize,
    chunks: &'a [String],
}

/// `docqa chunk`: show how each document was split.
pub async fn run_chunk(cfg: &Config, inputs: &[PathBuf], json: bool) -> Result<()> {
    let report = load_pool(cfg, inputs).await?;
    let texts = report.pool.texts();

    if json {
        let dumps: Vec<ChunkDump> = report
            .documents
            .iter()
            .zip(report.pool.documents())
            .map(|(doc, span)| ChunkDump {
                name: &doc.name,
                char_count: doc.char_count,
                chunks: &texts[span.start..span.start + span.len],
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&dumps)?);
        return Ok(());
    }

    for doc in &report.documents {
        println!(
            "{}: {} characters, {} chunks",
            doc.name, doc.char_count, doc.chunk_count
        );
        println!("--- preview ---");
        println!("{}", doc.preview);
        println!();
    }
    println!(
        "total: {} documents, {} chunks, {} skipped",
        report.documents.len(),
        report.pool.len(),
        report.failures.len()
    );
    Ok(())
}

/// `docqa chat`: pool once, then answer questions read line by line from stdin.
pub async fn run_chat(cfg: &Config, inputs: &[PathBuf], show_context: bool) -> Result<()> {
    let report = load_pool(cfg, inputs).await?;
    eprintln!(
        "Loaded {} documents ({} chunks). Ask a question, or `exit` to quit.",
        report.documents.len(),
        report.pool.len()
    );
    if report.pool.is_empty() {
        println!("{}", NO_DOCUMENTS);
        return Ok(());
    }
    let session = build_session(cfg, report, true)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question == "exit" || question == "quit" {
            break;
        }
        if question.is_empty() {
            eprintln!("Please enter a question.");
            continue;
        }
        // Provider errors end this question, not the session.
        if let Err(e) = answer_one(&session, question, show_context).await {
            eprintln!("Error: {:#}", e);
        }
    }
    Ok(())
}
