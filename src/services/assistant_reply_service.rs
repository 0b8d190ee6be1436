//! Turns one provider response into transcript text, a document delta and
//! image requests. Nothing in here fails: a call that cannot be recovered is
//! logged and skipped.

use std::sync::Arc;

use serde_json::Value;

use crate::constants::tools::{
    GENERATE_COVER_IMAGE_TOOL, GENERATE_OUTCOME_IMAGE_TOOL, UPDATE_QUIZ_TOOL,
};
use crate::models::domain::extraction::{CurrentDocumentSnapshot, ExtractionDelta, ImageRequest};
use crate::models::dto::provider::ProviderResponse;
use crate::models::dto::response::AssistantTurn;
use crate::models::dto::tool_arguments::{CoverImageArguments, OutcomeImageArguments};
use crate::services::extraction_normalizer::{
    normalize_with, sanitize_optional_string, IdGenerator, UuidGenerator,
};
use crate::services::json_repair::{repair, RepairError};
use crate::services::response_sanitizer::ResponseSanitizer;
use crate::services::tool_call_extractor::{
    unwrap_tool_envelope, CallSource, StructuredCall, ToolCallExtractor,
};

pub struct AssistantReplyService {
    extractor: ToolCallExtractor,
    ids: Arc<dyn IdGenerator>,
}

impl Default for AssistantReplyService {
    fn default() -> Self {
        Self::new(ResponseSanitizer::default())
    }
}

impl AssistantReplyService {
    pub fn new(sanitizer: ResponseSanitizer) -> Self {
        Self::with_id_generator(sanitizer, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(sanitizer: ResponseSanitizer, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            extractor: ToolCallExtractor::new(sanitizer),
            ids,
        }
    }

    pub fn process_reply(
        &self,
        response: &ProviderResponse,
        current: &CurrentDocumentSnapshot,
    ) -> AssistantTurn {
        let extracted = self.extractor.extract(response);
        let mut delta = ExtractionDelta::default();
        let mut image_requests = Vec::new();

        for call in &extracted.calls {
            let Some((name, arguments)) = decode_call(call) else {
                continue;
            };

            match name.as_str() {
                UPDATE_QUIZ_TOOL => {
                    let update = normalize_with(&arguments, current, self.ids.as_ref());
                    delta = delta.merge(update);
                }
                GENERATE_COVER_IMAGE_TOOL => image_requests.extend(cover_request(arguments)),
                GENERATE_OUTCOME_IMAGE_TOOL => image_requests.extend(outcome_request(arguments)),
                other => log::debug!("no handler for tool '{}'", other),
            }
        }

        log::info!(
            "processed reply: {} calls, {} image requests, delta empty: {}",
            extracted.calls.len(),
            image_requests.len(),
            delta.is_empty()
        );

        AssistantTurn {
            text: extracted.text,
            delta,
            image_requests,
        }
    }
}

/// Repairs a call's arguments and resolves inline `{name, arguments}` envelopes.
fn decode_call(call: &StructuredCall) -> Option<(String, Value)> {
    let value = repair_logged(&call.name, &call.arguments_text)?;

    let (name, arguments) = match call.source {
        CallSource::EmbeddedText => {
            unwrap_tool_envelope(&value).unwrap_or_else(|| (call.name.clone(), value))
        }
        CallSource::ToolCall => (call.name.clone(), value),
    };

    // some providers double-encode the arguments
    match arguments {
        Value::String(text) => repair_logged(&name, &text).map(|inner| (name, inner)),
        other => Some((name, other)),
    }
}

fn repair_logged(name: &str, text: &str) -> Option<Value> {
    match repair(text) {
        Ok(value) => Some(value),
        Err(RepairError::Unparsable {
            attempts,
            last_error,
            ..
        }) => {
            log::warn!(
                "dropping '{}' call after {} repair attempts: {} (offset {:?})",
                name,
                attempts,
                last_error.message,
                last_error.offset
            );
            None
        }
    }
}

fn cover_request(arguments: Value) -> Option<ImageRequest> {
    let args: CoverImageArguments = serde_json::from_value(arguments)
        .map_err(|e| log::warn!("invalid cover image arguments: {}", e))
        .ok()?;
    let prompt = sanitize_optional_string(&Value::from(args.prompt))?;
    Some(ImageRequest::Cover { prompt })
}

fn outcome_request(arguments: Value) -> Option<ImageRequest> {
    let args: OutcomeImageArguments = serde_json::from_value(arguments)
        .map_err(|e| log::warn!("invalid outcome image arguments: {}", e))
        .ok()?;
    let outcome_id = args.outcome_id.trim();
    if outcome_id.is_empty() {
        return None;
    }
    let prompt = sanitize_optional_string(&Value::from(args.prompt))?;
    Some(ImageRequest::Outcome {
        outcome_id: outcome_id.to_string(),
        prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::domain::quiz_question::{AnswerOption, Question};

    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn service() -> AssistantReplyService {
        AssistantReplyService::with_id_generator(
            ResponseSanitizer::default(),
            Arc::new(SequentialIds(AtomicUsize::new(0))),
        )
    }

    fn document_with_question() -> CurrentDocumentSnapshot {
        CurrentDocumentSnapshot {
            title: Some("Pets".to_string()),
            questions: vec![Question {
                id: "q-1".to_string(),
                text: "Cats or dogs?".to_string(),
                image_url: None,
                options: vec![AnswerOption {
                    id: "opt-1".to_string(),
                    text: "Cats".to_string(),
                    target_outcome_id: "o-1".to_string(),
                }],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn truncated_tool_call_still_yields_delta() {
        let response = ProviderResponse::from_text("<think>plan</think>Here is your quiz!")
            .with_tool_call(UPDATE_QUIZ_TOOL, r#"{"title":"Travel","questions":[{"text":"Beach or"#);

        let turn = service().process_reply(&response, &CurrentDocumentSnapshot::default());

        assert_eq!(turn.text, "Here is your quiz!");
        assert_eq!(turn.delta.title.as_deref(), Some("Travel"));
        let questions = turn.delta.questions.expect("questions should be recovered");
        assert_eq!(questions[0].text, "Beach or");
        assert_eq!(questions[0].id, "id-1");
    }

    #[test]
    fn unrecoverable_arguments_give_empty_delta() {
        let response = ProviderResponse::from_text("Done").with_tool_call(UPDATE_QUIZ_TOOL, "not json at all");
        let turn = service().process_reply(&response, &CurrentDocumentSnapshot::default());

        assert!(turn.delta.is_empty());
        assert_eq!(turn.text, "Done");
    }

    #[test]
    fn plain_conversation_has_no_changes() {
        let response = ProviderResponse::from_text("What should the quiz be about?");
        let turn = service().process_reply(&response, &document_with_question());

        assert_eq!(turn.text, "What should the quiz be about?");
        assert!(turn.delta.is_empty());
        assert!(turn.image_requests.is_empty());
    }

    #[test]
    fn unchanged_document_produces_no_changes() {
        let response = ProviderResponse::from_text("Kept it as is.").with_tool_call(
            UPDATE_QUIZ_TOOL,
            r#"{"title":"Pets","questions":[{"text":"Cats or dogs?","options":[{"text":"Cats","targetOutcomeId":"o-1"}]}]}"#,
        );
        let turn = service().process_reply(&response, &document_with_question());
        assert!(turn.delta.is_empty());
    }

    #[test]
    fn inline_json_in_text_is_applied() {
        let content = "Updated!\n```json\n{\"title\": \"Inline title\",}\n```";
        let turn = service().process_reply(&ProviderResponse::from_text(content), &CurrentDocumentSnapshot::default());

        assert_eq!(turn.text, "Updated!");
        assert_eq!(turn.delta.title.as_deref(), Some("Inline title"));
    }

    #[test]
    fn inline_envelope_with_string_arguments_is_unwrapped() {
        let content = r#"{"name":"update_quiz","arguments":"{\"title\":\"Wrapped\"}"}"#;
        let turn = service().process_reply(&ProviderResponse::from_text(content), &CurrentDocumentSnapshot::default());
        assert_eq!(turn.delta.title.as_deref(), Some("Wrapped"));
    }

    #[test]
    fn later_update_calls_win_per_field() {
        let response = ProviderResponse::from_text("")
            .with_tool_call(UPDATE_QUIZ_TOOL, r#"{"title":"First","description":"Kept"}"#)
            .with_tool_call(UPDATE_QUIZ_TOOL, r#"{"title":"Second"}"#);
        let turn = service().process_reply(&response, &CurrentDocumentSnapshot::default());

        assert_eq!(turn.delta.title.as_deref(), Some("Second"));
        assert_eq!(turn.delta.description.as_deref(), Some("Kept"));
    }

    #[test]
    fn image_tools_become_requests() {
        let response = ProviderResponse::from_text("Generating images")
            .with_tool_call(GENERATE_COVER_IMAGE_TOOL, r#"{"prompt":"a map with pins"}"#)
            .with_tool_call(GENERATE_OUTCOME_IMAGE_TOOL, r#"{"outcomeId":"o-1","prompt":"a cat on a sofa"}"#)
            .with_tool_call(GENERATE_OUTCOME_IMAGE_TOOL, r#"{"outcomeId":"o-2","prompt":"null"}"#);

        let turn = service().process_reply(&response, &CurrentDocumentSnapshot::default());

        assert_eq!(
            turn.image_requests,
            vec![
                ImageRequest::Cover {
                    prompt: "a map with pins".to_string()
                },
                ImageRequest::Outcome {
                    outcome_id: "o-1".to_string(),
                    prompt: "a cat on a sofa".to_string()
                },
            ]
        );
        assert!(turn.delta.is_empty());
    }

    #[test]
    fn extra_leak_patterns_apply_to_text() {
        let service = AssistantReplyService::new(
            ResponseSanitizer::default().with_additional_patterns(&[r"\bdebug:"]),
        );
        let turn = service.process_reply(
            &ProviderResponse::from_text("Debug: state dump\nAll set!"),
            &CurrentDocumentSnapshot::default(),
        );
        assert_eq!(turn.text, "All set!");
    }
}
