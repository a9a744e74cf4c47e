//! LLM-backed outreach core: structured email generation and document
//! analysis over a retrying completion client.
//!
//! The crate's heart is [`llm_client::CompletionClient`], which executes
//! "generate a JSON object from this prompt" operations with retry,
//! exponential backoff, and model fallback. [`generation`] and
//! [`analysis`] are thin consumers that build prompts, drive the client,
//! and enforce their own response schemas. Web serving, persistence, and
//! mail delivery live outside this crate.

pub mod analysis;
pub mod config;
pub mod document;
pub mod errors;
pub mod generation;
pub mod llm_client;

pub use analysis::{analyze_document, AnalyzerConfig, DocumentAnalysis};
pub use config::Config;
pub use errors::AppError;
pub use generation::compare::{compare_documents, DocumentComparison};
pub use generation::email::{generate_email, GeneratedEmail};
pub use llm_client::{CompletionClient, LlmError};
