//! Pulling structured data out of free-form completions

use serde::de::DeserializeOwned;

/// The outermost `{...}` block of a completion, if any.
/// Models like to wrap JSON in prose or code fences; this ignores both.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Deserialize the JSON object embedded in a completion
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> crate::Result<T> {
    let json = extract_json_object(text).ok_or_else(|| {
        crate::AnalyticsError::Oracle("completion contained no JSON object".to_string())
    })?;

    serde_json::from_str(json)
        .map_err(|e| crate::AnalyticsError::Oracle(format!("malformed JSON in completion: {}", e)))
}
