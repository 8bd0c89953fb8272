//! Context-string assembly from ranked chunks.

use crate::pool::ChunkPool;
use crate::retrieve::RankedChunk;

/// Separator between chunks in a context string.
pub const CONTEXT_DELIMITER: &str = "\n\n";

/// Join the first `top_k` ranked chunks in ranked order.
///
/// Ranked entries whose index is outside `chunks` are skipped.
pub fn join_ranked<S: AsRef<str>>(chunks: &[S], ranked: &[RankedChunk], top_k: usize) -> String {
    ranked
        .iter()
        .take(top_k)
        .filter_map(|r| chunks.get(r.index).map(|c| c.as_ref()))
        .collect::<Vec<&str>>()
        .join(CONTEXT_DELIMITER)
}

/// Like [`join_ranked`], but prefixes each chunk with the name of the
/// document it came from: `[source: report.pdf]\n<chunk text>`.
pub fn join_ranked_attributed(pool: &ChunkPool, ranked: &[RankedChunk], top_k: usize) -> String {
    ranked
        .iter()
        .take(top_k)
        .filter_map(|r| {
            let text = pool.get(r.index)?;
            let source = pool.document_of(r.index).unwrap_or("unknown");
            Some(format!("[source: {}]\n{}", source, text))
        })
        .collect::<Vec<String>>()
        .join(CONTEXT_DELIMITER)
}
