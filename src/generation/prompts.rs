// All prompt templates used by the structured generators. Templates are
// plain constants with `{placeholder}` tokens; the builder functions below
// are pure and free of I/O so they can be tested in isolation.

/// Email generation prompt. Replace `{task}` and `{recipient_name}`.
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"Generate a professional email based on the following task and recipient.
Task: {task}
Recipient Name: {recipient_name}

Please generate a JSON response with the following structure:
{
    "subject": "Email subject line",
    "body": "Email body content with proper greeting and closing",
    "tone": "The overall tone of the email (formal/informal/neutral)"
}

Make sure the email is professional, concise, and clearly communicates the task."#;

/// Segment analysis prompt. Replace `{segment}`.
pub const SEGMENT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following text segment for inconsistencies, logical fallacies, and unsupported statements.
Return the analysis in JSON format with the following structure:
{
    "inconsistencies": ["List of identified inconsistencies"],
    "logical_fallacies": ["List of logical fallacies found"],
    "unsupported_statements": ["List of statements that lack proper support or evidence"],
    "suggestions": ["List of suggestions for improvement"]
}

Text to analyze:
{segment}"#;

/// Two-document comparison prompt.
/// Replace `{name_a}`, `{text_a}`, `{name_b}`, `{text_b}`.
pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"Analyze and compare the following two documents for inconsistencies, logical fallacies, and unsupported statements. Highlight any discrepancies between them.
Return the comparison as a JSON object with the following structure:
{
    "discrepancies": ["List of discrepancies between the two documents"],
    "inconsistencies": ["List of inconsistencies found within either document"],
    "summary": "A short overall assessment of how the documents relate"
}

Document 1 ({name_a}):
{text_a}

Document 2 ({name_b}):
{text_b}"#;

pub fn email_prompt(task: &str, recipient_name: &str) -> String {
    EMAIL_PROMPT_TEMPLATE
        .replace("{task}", task)
        .replace("{recipient_name}", recipient_name)
}

pub fn segment_analysis_prompt(segment: &str) -> String {
    SEGMENT_ANALYSIS_PROMPT_TEMPLATE.replace("{segment}", segment)
}

pub fn comparison_prompt(name_a: &str, text_a: &str, name_b: &str, text_b: &str) -> String {
    COMPARISON_PROMPT_TEMPLATE
        .replace("{name_a}", name_a)
        .replace("{text_a}", text_a)
        .replace("{name_b}", name_b)
        .replace("{text_b}", text_b)
}
