//! Document ingestion: path discovery → extraction → chunking → pooling.
//!
//! Each document is extracted and chunked on the blocking thread pool.
//! Results are awaited in upload order, so pool indices (and therefore the
//! retrieval tie-break) do not depend on which task finishes first.
//!
//! A document that fails to extract is recorded in
//! [`IngestReport::failures`] and skipped; the rest are still pooled.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

use docqa_core::{ChunkParams, ChunkPool, ExtractError, TextExtractor};

use crate::extract::DocumentKind;

/// Characters shown by [`IngestedDocument::preview`].
pub const PREVIEW_CHARS: usize = 1000;

/// A document's extracted text.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: String,
}

/// Summary of one successfully pooled document.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestedDocument {
    pub name: String,
    pub char_count: usize,
    pub chunk_count: usize,
    /// The first [`PREVIEW_CHARS`] characters of the extracted text.
    pub preview: String,
}

/// A document that could not be extracted.
#[derive(Debug)]
pub struct IngestFailure {
    pub name: String,
    pub error: ExtractError,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub pool: ChunkPool,
    pub documents: Vec<IngestedDocument>,
    pub failures: Vec<IngestFailure>,
}

/// Expand `inputs` into an ordered file list.
///
/// Files are kept in the order given, whatever their extension, so an
/// unsupported file surfaces as an extraction failure. Directories are
/// walked recursively for supported extensions and their entries sorted
/// by path.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(input).follow_links(false) {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory: {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file() && is_supported(path) {
                    found.push(path.to_path_buf());
                }
            }
            found.sort();
            debug!(dir = %input.display(), files = found.len(), "walked input directory");
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            bail!("No such file or directory: {}", input.display());
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(DocumentKind::from_name)
        .is_some()
}

/// Read, extract, and chunk every file, then pool the chunks in order.
pub async fn ingest_paths(
    paths: &[PathBuf],
    extractor: Arc<dyn TextExtractor>,
    params: ChunkParams,
) -> IngestReport {
    let started = Instant::now();

    let handles: Vec<_> = paths
        .iter()
        .map(|path| {
            let path = path.clone();
            let extractor = Arc::clone(&extractor);
            tokio::task::spawn_blocking(move || {
                let doc = load_document(&path, extractor.as_ref())?;
                let chunks = params.split(&doc.text);
                Ok::<_, ExtractError>((doc, chunks))
            })
        })
        .collect();

    let mut report = IngestReport::default();
    for (path, handle) in paths.iter().zip(handles) {
        let name = path.display().to_string();
        let loaded = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ExtractError::Aborted(e.to_string())),
        };
        match loaded {
            Ok((doc, chunks)) => add_document(&mut report, doc, chunks),
            Err(error) => {
                debug!(document = %name, error = %error, "skipping document");
                report.failures.push(IngestFailure { name, error });
            }
        }
    }

    info!(
        documents = report.documents.len(),
        failed = report.failures.len(),
        chunks = report.pool.len(),
        chunk_size = params.chunk_size(),
        overlap = params.overlap(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "ingestion complete"
    );
    report
}

fn load_document(path: &Path, extractor: &dyn TextExtractor) -> Result<Document, ExtractError> {
    let name = path.display().to_string();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name.as_str());
    let bytes = std::fs::read(path)?;
    let text = extractor.extract(file_name, &bytes)?;
    Ok(Document { name, text })
}

fn add_document(report: &mut IngestReport, doc: Document, chunks: Vec<String>) {
    debug!(document = %doc.name, chunks = chunks.len(), "chunked document");
    report.documents.push(IngestedDocument {
        name: doc.name.clone(),
        char_count: doc.text.chars().count(),
        chunk_count: chunks.len(),
        preview: doc.text.chars().take(PREVIEW_CHARS).collect(),
    });
    report.pool.push_document(doc.name, chunks);
}
