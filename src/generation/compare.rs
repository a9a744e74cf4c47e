//! Two-document comparison — contrasts a pair of extracted texts and
//! reports discrepancies between them.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::{parse_schema, prompts, require_nonempty};
use crate::llm_client::CompletionClient;

/// Character budget per document embedded into the comparison prompt.
/// Longer texts are truncated; cross-document comparison needs both texts
/// in a single prompt, so it cannot reuse the per-chunk analysis path.
const COMPARISON_CHAR_BUDGET: usize = 4_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentComparison {
    pub discrepancies: Vec<String>,
    pub inconsistencies: Vec<String>,
    pub summary: String,
}

/// Compares two documents by name and extracted text.
pub async fn compare_documents(
    name_a: &str,
    text_a: &str,
    name_b: &str,
    text_b: &str,
    client: &CompletionClient,
) -> Result<DocumentComparison, AppError> {
    if text_a.trim().is_empty() || text_b.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "both documents must contain text to compare".to_string(),
        ));
    }

    let prompt = prompts::comparison_prompt(
        name_a,
        truncate_chars(text_a, COMPARISON_CHAR_BUDGET),
        name_b,
        truncate_chars(text_b, COMPARISON_CHAR_BUDGET),
    );
    let raw = client.execute(&prompt).await?;

    let comparison: DocumentComparison = parse_schema(&raw, "document comparison")?;
    require_nonempty("summary", &comparison.summary)?;
    Ok(comparison)
}

/// Truncates to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::scripted_client;

    const COMPARISON_JSON: &str = r#"{
        "discrepancies": ["Dates differ between documents"],
        "inconsistencies": [],
        "summary": "The documents broadly agree apart from the reporting dates."
    }"#;

    #[tokio::test]
    async fn test_compares_two_documents() {
        let (client, provider) = scripted_client(vec![Ok(COMPARISON_JSON.to_string())]);

        let comparison =
            compare_documents("a.pdf", "alpha", "b.pdf", "beta", &client).await.unwrap();

        assert_eq!(comparison.discrepancies.len(), 1);
        let prompts = provider.prompts();
        assert!(prompts[0].contains("Document 1 (a.pdf)"));
        assert!(prompts[0].contains("Document 2 (b.pdf)"));
    }

    #[tokio::test]
    async fn test_empty_document_fails_without_network_call() {
        let (client, provider) = scripted_client(vec![]);

        let err = compare_documents("a.pdf", " ", "b.pdf", "beta", &client)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_documents_are_truncated_in_prompt() {
        let (client, provider) = scripted_client(vec![Ok(COMPARISON_JSON.to_string())]);
        let long_text = "x".repeat(10_000);

        compare_documents("a.pdf", &long_text, "b.pdf", "beta", &client)
            .await
            .unwrap();

        let prompt = provider.prompts().remove(0);
        assert!(prompt.len() < 10_000);
        assert!(prompt.contains(&"x".repeat(COMPARISON_CHAR_BUDGET)));
        assert!(!prompt.contains(&"x".repeat(COMPARISON_CHAR_BUDGET + 1)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "aé漢字b";
        assert_eq!(truncate_chars(text, 3), "aé漢");
        assert_eq!(truncate_chars(text, 10), text);
        assert_eq!(truncate_chars("", 5), "");
    }
}
