//! Segment analyzer — analyzes arbitrarily long documents by chunking
//! them into word-bounded segments, running one completion per segment,
//! and merging the per-segment findings.
//!
//! Chunks are processed strictly sequentially. Individual chunk failures
//! are logged and tolerated up to a configured bound; the bound is a
//! separate knob from the completion client's retry budget.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::{parse_schema, prompts};
use crate::llm_client::CompletionClient;

pub mod chunker;

use chunker::word_chunks;

/// Analyzer knobs, independent of the retry policy.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum words per chunk.
    pub chunk_words: usize,
    /// Chunk failures tolerated before the whole document fails.
    pub max_chunk_failures: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            chunk_words: 1_000,
            max_chunk_failures: 3,
        }
    }
}

/// Accumulated findings for a document, one ordered list per category.
/// Lists never contain exact duplicates; first-seen order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub inconsistencies: Vec<String>,
    pub logical_fallacies: Vec<String>,
    pub unsupported_statements: Vec<String>,
    pub suggestions: Vec<String>,
}

impl DocumentAnalysis {
    /// Folds another chunk's findings in, deduplicating exact strings
    /// per category. Idempotent: merging the same findings twice leaves
    /// each exactly once, in first-seen position.
    pub fn merge(&mut self, other: DocumentAnalysis) {
        merge_category(&mut self.inconsistencies, other.inconsistencies);
        merge_category(&mut self.logical_fallacies, other.logical_fallacies);
        merge_category(&mut self.unsupported_statements, other.unsupported_statements);
        merge_category(&mut self.suggestions, other.suggestions);
    }
}

fn merge_category(into: &mut Vec<String>, from: Vec<String>) {
    for finding in from {
        if !into.contains(&finding) {
            into.push(finding);
        }
    }
}

/// Analyzes one text segment for inconsistencies and logical issues.
pub async fn analyze_segment(
    segment: &str,
    client: &CompletionClient,
) -> Result<DocumentAnalysis, AppError> {
    let prompt = prompts::segment_analysis_prompt(segment);
    let raw = client.execute(&prompt).await?;
    parse_schema(&raw, "segment analysis")
}

/// Analyzes a whole document chunk by chunk, merging partial results.
///
/// Fails with `TooManyChunkFailures` once more than
/// `config.max_chunk_failures` chunks have failed, and with
/// `NoAnalyzableContent` when no chunk produced a usable result.
pub async fn analyze_document(
    text: &str,
    client: &CompletionClient,
    config: &AnalyzerConfig,
) -> Result<DocumentAnalysis, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "document text must not be empty".to_string(),
        ));
    }

    let mut accumulator = DocumentAnalysis::default();
    let mut analyzed = 0usize;
    let mut failed = 0usize;

    for (index, chunk) in word_chunks(text, config.chunk_words).enumerate() {
        match analyze_segment(&chunk, client).await {
            Ok(result) => {
                accumulator.merge(result);
                analyzed += 1;
            }
            Err(e) => {
                failed += 1;
                warn!(chunk = index, error = %e, "chunk analysis failed, continuing");
                if failed > config.max_chunk_failures {
                    return Err(AppError::TooManyChunkFailures {
                        failed,
                        tolerated: config.max_chunk_failures,
                    });
                }
            }
        }
    }

    if analyzed == 0 {
        return Err(AppError::NoAnalyzableContent);
    }

    info!(chunks = analyzed, failed, "document analysis complete");
    Ok(accumulator)
}
