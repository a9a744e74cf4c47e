//! Email generator — turns an outreach task description and a recipient
//! name into a schema-validated professional email.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::{parse_schema, prompts, require_nonempty};
use crate::llm_client::CompletionClient;

/// A generated outreach email. Every field is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
    /// Overall register of the email: formal, informal, or neutral.
    pub tone: String,
}

/// Generates a professional email for the given task and recipient.
/// Empty or whitespace-only inputs are rejected before any network call.
pub async fn generate_email(
    task: &str,
    recipient_name: &str,
    client: &CompletionClient,
) -> Result<GeneratedEmail, AppError> {
    if task.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "task description must not be empty".to_string(),
        ));
    }
    if recipient_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "recipient name must not be empty".to_string(),
        ));
    }

    let prompt = prompts::email_prompt(task, recipient_name);
    let raw = client.execute(&prompt).await?;

    let email: GeneratedEmail = parse_schema(&raw, "generated email")?;
    require_nonempty("subject", &email.subject)?;
    require_nonempty("body", &email.body)?;
    require_nonempty("tone", &email.tone)?;

    info!(recipient = recipient_name, tone = %email.tone, "email generated");
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::scripted_client;

    const EMAIL_JSON: &str = r#"{
        "subject": "Quarterly report",
        "body": "Dear Bob,\n\nPlease find the report attached.\n\nBest regards",
        "tone": "formal"
    }"#;

    #[tokio::test]
    async fn test_generates_email_from_valid_response() {
        let (client, _) = scripted_client(vec![Ok(EMAIL_JSON.to_string())]);

        let email = generate_email("Write report", "Bob", &client).await.unwrap();

        assert_eq!(email.subject, "Quarterly report");
        assert_eq!(email.tone, "formal");
        assert!(email.body.starts_with("Dear Bob"));
    }

    #[tokio::test]
    async fn test_prompt_embeds_task_and_recipient() {
        let (client, provider) = scripted_client(vec![Ok(EMAIL_JSON.to_string())]);

        generate_email("Write report", "Bob", &client).await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Task: Write report"));
        assert!(prompts[0].contains("Recipient Name: Bob"));
    }

    #[tokio::test]
    async fn test_empty_task_fails_without_network_call() {
        let (client, provider) = scripted_client(vec![]);

        let err = generate_email("", "Bob", &client).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_recipient_fails_without_network_call() {
        let (client, provider) = scripted_client(vec![]);

        let err = generate_email("Write report", "   ", &client).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_schema_mismatch_naming_the_field() {
        let (client, _) = scripted_client(vec![Ok(
            r#"{"subject": "s", "tone": "formal"}"#.to_string(),
        )]);

        let err = generate_email("Write report", "Bob", &client).await.unwrap_err();

        match err {
            AppError::SchemaMismatch(msg) => assert!(msg.contains("body"), "got: {msg}"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mistyped_field_is_schema_mismatch() {
        let (client, _) = scripted_client(vec![Ok(
            r#"{"subject": "s", "body": 42, "tone": "formal"}"#.to_string(),
        )]);

        let err = generate_email("Write report", "Bob", &client).await.unwrap_err();

        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[tokio::test]
    async fn test_blank_subject_is_schema_mismatch() {
        let (client, _) = scripted_client(vec![Ok(
            r#"{"subject": "  ", "body": "b", "tone": "neutral"}"#.to_string(),
        )]);

        let err = generate_email("Write report", "Bob", &client).await.unwrap_err();

        match err {
            AppError::SchemaMismatch(msg) => assert!(msg.contains("subject"), "got: {msg}"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
