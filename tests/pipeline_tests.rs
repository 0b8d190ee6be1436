use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use quiz_builder_server::{
    constants::tools::{GENERATE_OUTCOME_IMAGE_TOOL, UPDATE_QUIZ_TOOL},
    models::{
        domain::{CurrentDocumentSnapshot, ImageRequest, QuizDocument},
        dto::provider::ProviderResponse,
    },
    services::{
        assistant_reply_service::AssistantReplyService,
        extraction_normalizer::{normalize, sanitize_optional_string, IdGenerator},
        json_repair::repair,
        response_sanitizer::{sanitize, ResponseSanitizer},
    },
};

struct CountingIds(AtomicUsize);

impl IdGenerator for CountingIds {
    fn next_id(&self) -> String {
        format!("gen-{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

fn reply_service() -> AssistantReplyService {
    AssistantReplyService::with_id_generator(
        ResponseSanitizer::default(),
        Arc::new(CountingIds(AtomicUsize::new(0))),
    )
}

const FULL_QUIZ: &str = r#"{
    "title": "Which travel style suits you?",
    "description": "Five quick questions",
    "outcomes": [
        {"id": "beach", "title": "Beach lover", "description": "Sun and sand"},
        {"id": "city", "title": "City explorer", "imageUrl": "https://example.com/city.png"}
    ],
    "questions": [
        {"text": "Pick a drink", "options": [
            {"text": "Coconut water", "targetOutcomeId": "beach"},
            {"text": "Espresso", "targetOutcomeId": "city"}
        ]}
    ]
}"#;

#[test]
fn repair_examples() {
    assert_eq!(repair(r#"{"a":1 "b":2}"#).ok(), Some(json!({"a": 1, "b": 2})));
    assert_eq!(repair(r#"{"a":"hello"#).ok(), Some(json!({"a": "hello"})));
    assert_eq!(repair(r#"{"a":{"b":1}}}"#).ok(), Some(json!({"a": {"b": 1}})));
    assert_eq!(repair(r#"{"a":1,}"#).ok(), Some(json!({"a": 1})));
}

#[test]
fn valid_json_is_parsed_unchanged() {
    let parsed = repair(FULL_QUIZ).expect("valid JSON should parse");
    let direct: Value = serde_json::from_str(FULL_QUIZ).expect("fixture is valid");
    assert_eq!(parsed, direct);
}

#[test]
fn sanitizer_examples() {
    assert_eq!(sanitize("<think>secret plan</think>Hello!"), "Hello!");
    assert_eq!(sanitize("Again\nAgain\nAgain"), "Again\nAgain");
}

#[test]
fn placeholder_examples() {
    assert_eq!(sanitize_optional_string(&json!("string (optional)")), None);
    assert_eq!(sanitize_optional_string(&json!("https://example.com/x.png")), None);
    assert_eq!(
        sanitize_optional_string(&json!("https://cdn.real.com/x.png")).as_deref(),
        Some("https://cdn.real.com/x.png")
    );
}

#[test]
fn full_quiz_from_tool_call() {
    let response = ProviderResponse::from_text("Here's a first draft. Want more questions?")
        .with_tool_call(UPDATE_QUIZ_TOOL, FULL_QUIZ);

    let turn = reply_service().process_reply(&response, &CurrentDocumentSnapshot::default());
    let delta = turn.delta;

    assert_eq!(delta.title.as_deref(), Some("Which travel style suits you?"));
    let outcomes = delta.outcomes.expect("outcomes should be present");
    let questions = delta.questions.expect("questions should be present");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].image_url, None, "fake domain must be dropped");

    // options point at the ids the pipeline assigned, not the model's labels
    let targets: Vec<&str> = questions[0]
        .options
        .iter()
        .map(|o| o.target_outcome_id.as_str())
        .collect();
    assert_eq!(targets, vec![outcomes[0].id.as_str(), outcomes[1].id.as_str()]);
}

#[test]
fn second_turn_reuses_ids_and_only_reports_changes() {
    let service = reply_service();
    let first = ProviderResponse::from_text("Draft ready.").with_tool_call(UPDATE_QUIZ_TOOL, FULL_QUIZ);

    let mut quiz = QuizDocument::new_draft(None, None);
    let first_turn = service.process_reply(&first, &quiz.snapshot());
    assert!(quiz.apply_delta(&first_turn.delta));

    let renamed = FULL_QUIZ.replace("Which travel style suits you?", "Your travel style");
    let second = ProviderResponse::from_text("Renamed.").with_tool_call(UPDATE_QUIZ_TOOL, renamed);
    let second_turn = service.process_reply(&second, &quiz.snapshot());

    assert_eq!(second_turn.delta.title.as_deref(), Some("Your travel style"));
    assert!(second_turn.delta.questions.is_none());
    assert!(second_turn.delta.outcomes.is_none());

    let question_id = quiz.questions[0].id.clone();
    quiz.apply_delta(&second_turn.delta);
    assert_eq!(quiz.questions[0].id, question_id);
}

#[test]
fn identical_payload_normalizes_to_empty_delta() {
    let mut quiz = QuizDocument::new_draft(None, None);
    let payload: Value = serde_json::from_str(FULL_QUIZ).expect("fixture is valid");
    quiz.apply_delta(&normalize(&payload, &quiz.snapshot()));

    assert!(normalize(&payload, &quiz.snapshot()).is_empty());
}

#[test]
fn truncated_reply_keeps_what_was_sent() {
    let truncated = &FULL_QUIZ[..FULL_QUIZ.find("\"questions\"").expect("fixture has questions")];
    let response = ProviderResponse::from_text("Working on it").with_tool_call(UPDATE_QUIZ_TOOL, truncated);

    let turn = reply_service().process_reply(&response, &CurrentDocumentSnapshot::default());

    assert_eq!(turn.delta.title.as_deref(), Some("Which travel style suits you?"));
    assert_eq!(turn.delta.outcomes.map(|o| o.len()), Some(2));
    assert!(turn.delta.questions.is_none());
}

#[test]
fn leaked_tool_chatter_never_reaches_text() {
    let content = "<think>call update_quiz with outcomes</think>\
                   [internal]user confirmed the title[/internal]\
                   Great, I've added two outcomes!\n\
                   I will call update_quiz now.";
    let response = ProviderResponse::from_text(content).with_tool_call(
        GENERATE_OUTCOME_IMAGE_TOOL,
        r#"{"outcomeId":"beach","prompt":"palm trees at sunset"}"#,
    );

    let turn = reply_service().process_reply(&response, &CurrentDocumentSnapshot::default());

    assert_eq!(turn.text, "Great, I've added two outcomes!");
    assert_eq!(
        turn.image_requests,
        vec![ImageRequest::Outcome {
            outcome_id: "beach".to_string(),
            prompt: "palm trees at sunset".to_string(),
        }]
    );
}

#[test]
fn garbage_arguments_degrade_to_no_change() {
    let response = ProviderResponse::from_text("Oops").with_tool_call(UPDATE_QUIZ_TOOL, "}}}{{{ nope");
    let turn = reply_service().process_reply(&response, &CurrentDocumentSnapshot::default());

    assert!(turn.delta.is_empty());
    assert_eq!(turn.text, "Oops");
}
