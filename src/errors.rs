use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type returned by the generators and the
/// segment analyzer. Provider/retry failures are wrapped as `Llm`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Response schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Document analysis aborted: {failed} chunks failed (tolerated {tolerated})")]
    TooManyChunkFailures { failed: usize, tolerated: usize },

    #[error("No analyzable content: no chunk produced a usable result")]
    NoAnalyzableContent,

    #[error("Document extraction failed: {0}")]
    Extraction(String),
}
