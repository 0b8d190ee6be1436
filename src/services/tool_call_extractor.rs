//! Splits a provider response into user-facing text and structured calls.
//!
//! Calls come either from real tool invocations or, when the model wrote its
//! update inline, from JSON found inside the reply text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::tools::{is_known_tool, UPDATE_QUIZ_TOOL};
use crate::models::dto::provider::ProviderResponse;
use crate::services::response_sanitizer::ResponseSanitizer;

static FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?\s*(\{.*?)```").expect("valid fenced json regex")
});
static UNCLOSED_FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?\s*(\{.*)$").expect("valid fenced json regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSource {
    ToolCall,
    EmbeddedText,
}

/// A named call whose arguments still need repair and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCall {
    pub name: String,
    pub arguments_text: String,
    pub source: CallSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReply {
    pub calls: Vec<StructuredCall>,
    /// Sanitized prose for the transcript.
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ToolCallExtractor {
    sanitizer: ResponseSanitizer,
}

impl ToolCallExtractor {
    pub fn new(sanitizer: ResponseSanitizer) -> Self {
        Self { sanitizer }
    }

    pub fn extract(&self, response: &ProviderResponse) -> ExtractedReply {
        let content = response.content.as_deref().unwrap_or_default();

        let mut calls: Vec<StructuredCall> = response
            .tool_calls
            .iter()
            .filter(|call| {
                let known = is_known_tool(&call.name);
                if !known {
                    log::debug!("ignoring unknown tool call '{}'", call.name);
                }
                known
            })
            .filter_map(|call| {
                let arguments = call.arguments.as_deref().map(str::trim)?;
                if arguments.is_empty() {
                    log::debug!("skipping '{}' call with empty arguments", call.name);
                    return None;
                }
                Some(StructuredCall {
                    name: call.name.clone(),
                    arguments_text: arguments.to_string(),
                    source: CallSource::ToolCall,
                })
            })
            .collect();

        let has_update = calls.iter().any(|call| call.name == UPDATE_QUIZ_TOOL);
        if !has_update {
            if let Some(embedded) = find_embedded_json(content) {
                log::debug!("found {} bytes of inline JSON in reply text", embedded.len());
                calls.push(StructuredCall {
                    name: UPDATE_QUIZ_TOOL.to_string(),
                    arguments_text: embedded.to_string(),
                    source: CallSource::EmbeddedText,
                });
            }
        }

        ExtractedReply {
            calls,
            text: self.sanitizer.sanitize(content),
        }
    }
}

/// Locates JSON the model wrote inline: a fenced block first, otherwise the
/// first balanced object, otherwise everything from the first `{` on.
pub fn find_embedded_json(content: &str) -> Option<&str> {
    if let Some(body) = FENCED_OBJECT
        .captures(content)
        .and_then(|caps| caps.get(1))
    {
        return Some(body.as_str().trim());
    }
    if let Some(body) = UNCLOSED_FENCED_OBJECT
        .captures(content)
        .and_then(|caps| caps.get(1))
    {
        return Some(body.as_str().trim());
    }

    let start = content.find('{')?;
    let rest = &content[start..];
    Some(first_balanced_object(rest).unwrap_or(rest).trim())
}

fn first_balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Unwraps `{"name": "<known tool>", "arguments": ...}` written inline.
/// Returns the tool name and its argument value, or `None` if `value` is
/// not such an envelope.
pub fn unwrap_tool_envelope(value: &Value) -> Option<(String, Value)> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?;
    if !is_known_tool(name) {
        return None;
    }
    let arguments = obj.get("arguments").or_else(|| obj.get("parameters"))?;
    Some((name.to_string(), arguments.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::tools::GENERATE_OUTCOME_IMAGE_TOOL;
    use serde_json::json;

    fn extractor() -> ToolCallExtractor {
        ToolCallExtractor::default()
    }

    #[test]
    fn keeps_known_calls_and_ignores_unknown() {
        let response = ProviderResponse::from_text("Done!")
            .with_tool_call(UPDATE_QUIZ_TOOL, r#"{"title":"T"}"#)
            .with_tool_call("delete_everything", "{}");

        let reply = extractor().extract(&response);
        assert_eq!(reply.calls.len(), 1);
        assert_eq!(reply.calls[0].name, UPDATE_QUIZ_TOOL);
        assert_eq!(reply.calls[0].source, CallSource::ToolCall);
        assert_eq!(reply.text, "Done!");
    }

    #[test]
    fn skips_calls_with_missing_or_empty_arguments() {
        let mut response = ProviderResponse::from_text("Hi").with_tool_call(UPDATE_QUIZ_TOOL, "   ");
        response.tool_calls.push(crate::models::dto::provider::ToolInvocation {
            name: GENERATE_OUTCOME_IMAGE_TOOL.to_string(),
            arguments: None,
        });

        let reply = extractor().extract(&response);
        assert!(reply.calls.is_empty());
    }

    #[test]
    fn finds_fenced_json_in_text() {
        let content = "Here it is:\n```json\n{\"title\":\"Inline\"}\n```\nLike it?";
        let reply = extractor().extract(&ProviderResponse::from_text(content));

        assert_eq!(reply.calls.len(), 1);
        assert_eq!(reply.calls[0].arguments_text, r#"{"title":"Inline"}"#);
        assert_eq!(reply.calls[0].source, CallSource::EmbeddedText);
        assert_eq!(reply.text, "Here it is:\n\nLike it?");
    }

    #[test]
    fn finds_truncated_unfenced_json() {
        let content = r#"Sure! {"title":"Quiz","questions":[{"text":"Q1"#;
        assert_eq!(
            find_embedded_json(content),
            Some(r#"{"title":"Quiz","questions":[{"text":"Q1"#)
        );
    }

    #[test]
    fn balanced_object_stops_before_trailing_prose() {
        let content = r#"Update: {"title":"a } b"} and that's it."#;
        assert_eq!(find_embedded_json(content), Some(r#"{"title":"a } b"}"#));
    }

    #[test]
    fn plain_text_has_no_calls() {
        let reply = extractor().extract(&ProviderResponse::from_text("What topic should the quiz cover?"));
        assert!(reply.calls.is_empty());
    }

    #[test]
    fn inline_json_is_ignored_when_a_real_update_call_exists() {
        let response = ProviderResponse::from_text("```json\n{\"title\":\"Inline\"}\n```")
            .with_tool_call(UPDATE_QUIZ_TOOL, r#"{"title":"Tool"}"#);
        let reply = extractor().extract(&response);
        assert_eq!(reply.calls.len(), 1);
        assert_eq!(reply.calls[0].arguments_text, r#"{"title":"Tool"}"#);
    }

    #[test]
    fn unwraps_inline_tool_envelope() {
        let value = json!({"name": "update_quiz", "arguments": {"title": "Wrapped"}});
        let (name, arguments) = unwrap_tool_envelope(&value).expect("envelope");
        assert_eq!(name, UPDATE_QUIZ_TOOL);
        assert_eq!(arguments, json!({"title": "Wrapped"}));
    }

    #[test]
    fn plain_payload_is_not_an_envelope() {
        assert!(unwrap_tool_envelope(&json!({"title": "Quiz", "name": "Bob"})).is_none());
    }
}
