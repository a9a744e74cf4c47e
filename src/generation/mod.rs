// Structured generators: domain prompts in, schema-validated objects out.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod compare;
pub mod email;
pub mod prompts;

use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Parses a JSON-object response into the generator's typed schema.
/// Missing or mistyped fields surface as `SchemaMismatch` naming the field
/// (serde's error message carries it).
pub(crate) fn parse_schema<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::SchemaMismatch(format!("{what}: {e}")))
}

/// Required-field check layered on top of deserialization: present but
/// blank string fields are still a schema violation.
pub(crate) fn require_nonempty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::SchemaMismatch(format!(
            "field `{field}` is empty"
        )));
    }
    Ok(())
}
