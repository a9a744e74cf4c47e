//! Document text extraction for the analysis pipeline.

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    /// Detects the format from a file name's extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" | "md" => Some(DocumentFormat::Text),
            _ => None,
        }
    }
}

/// Extracts plain text from a document's raw bytes.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String, AppError> {
    match format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("failed to extract text from PDF: {e}"))),
        DocumentFormat::Docx => extract_docx_text(bytes),
        DocumentFormat::Text => String::from_utf8(bytes.to_vec())
            .map_err(|e| AppError::Extraction(format!("text file is not valid UTF-8: {e}"))),
    }
}

/// Top-level paragraph texts joined with newlines. Runs inside a paragraph
/// are concatenated; table and header content is not traversed.
fn extract_docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let docx = read_docx(bytes)
        .map_err(|e| AppError::Extraction(format!("failed to extract text from DOCX: {e:?}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}
