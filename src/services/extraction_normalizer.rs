//! Maps an untyped `update_quiz` payload onto a typed, delta-only change set.
//!
//! Identifiers are reused from the current document by position, values the
//! model made up (schema echoes, fake domains, "null") are stripped, and
//! anything equal to what the document already holds is left out. A field
//! whose shape is wrong is dropped on its own; normalization never fails.

use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::patterns::{PLACEHOLDER_MAX_LEN, URL_PREFIXES};
use crate::models::domain::extraction::{CurrentDocumentSnapshot, ExtractionDelta};
use crate::models::domain::lead_gen::{LeadField, LeadGen};
use crate::models::domain::outcome::Outcome;
use crate::models::domain::quiz_question::{AnswerOption, Question};
use crate::services::pattern_table::{
    normalize_for_matching, FAKE_DOMAIN_TABLE, NULLISH_TABLE, PLACEHOLDER_KEYWORD_TABLE,
    PLACEHOLDER_QUALIFIER_TABLE,
};

/// Source of identifiers for items the current document does not have yet.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

pub fn normalize(payload: &Value, current: &CurrentDocumentSnapshot) -> ExtractionDelta {
    normalize_with(payload, current, &UuidGenerator)
}

pub fn normalize_with(
    payload: &Value,
    current: &CurrentDocumentSnapshot,
    ids: &dyn IdGenerator,
) -> ExtractionDelta {
    let Some(obj) = payload.as_object() else {
        log::debug!("update payload is not an object, nothing to extract");
        return ExtractionDelta::default();
    };

    let changed = |keys: &[&str], existing: &Option<String>| {
        sanitized_field(obj, keys).filter(|value| Some(value) != existing.as_ref())
    };

    // outcomes first: options may point at the ids the model gave them
    let mut outcome_ids = HashMap::new();
    let outcomes = field(obj, &["outcomes"])
        .and_then(|value| normalize_outcomes(value, &current.outcomes, &mut outcome_ids, ids))
        .filter(|outcomes| outcomes != &current.outcomes);

    let questions = field(obj, &["questions"])
        .and_then(|value| normalize_questions(value, &current.questions, &outcome_ids, ids))
        .filter(|questions| questions != &current.questions);

    ExtractionDelta {
        title: changed(&["title"], &current.title),
        description: changed(&["description"], &current.description),
        cover_image_url: changed(&["coverImageUrl", "cover_image_url"], &current.cover_image_url),
        cover_image_prompt: sanitized_field(obj, &["coverImagePrompt", "cover_image_prompt"]),
        cta_text: changed(&["ctaText", "cta_text"], &current.cta_text),
        cta_url: changed(&["ctaUrl", "cta_url"], &current.cta_url),
        questions,
        outcomes,
        lead_gen: field(obj, &["leadGen", "lead_gen"]).and_then(normalize_lead_gen),
    }
}

/// Accepts a string only if it carries real content.
///
/// Links (`http(s)://`, `data:image/`) are kept as long as they do not point
/// at a well-known fake domain. Other text is rejected when it is a nullish
/// token, or when it contains a placeholder keyword and is either very short
/// or marked "optional".
pub fn sanitize_optional_string(value: &Value) -> Option<String> {
    let Value::String(raw) = value else {
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if has_prefix_ignore_case(trimmed, "data:image/") {
        return Some(trimmed.to_string());
    }

    let normalized = normalize_for_matching(trimmed);
    if FAKE_DOMAIN_TABLE.matches_any(&normalized) {
        return None;
    }
    if URL_PREFIXES
        .iter()
        .any(|prefix| has_prefix_ignore_case(trimmed, prefix))
    {
        return Some(trimmed.to_string());
    }

    if NULLISH_TABLE.matches_any(&normalized) {
        return None;
    }
    if PLACEHOLDER_KEYWORD_TABLE.matches_any(&normalized)
        && (PLACEHOLDER_QUALIFIER_TABLE.matches_any(&normalized)
            || normalized.chars().count() <= PLACEHOLDER_MAX_LEN)
    {
        return None;
    }

    Some(trimmed.to_string())
}

fn has_prefix_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// First non-null value among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn sanitized_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(sanitize_optional_string)
}

/// Trimmed text of a required item label. Answers such as "None" or "N/A"
/// are real content here, so the placeholder tables are not consulted.
fn non_empty_text(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(non_empty_text)
}

fn normalize_questions(
    value: &Value,
    current: &[Question],
    outcome_ids: &HashMap<String, String>,
    ids: &dyn IdGenerator,
) -> Option<Vec<Question>> {
    let items = value.as_array()?;

    let questions: Vec<Question> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let obj = item.as_object()?;
            let text = text_field(obj, &["text", "question"])?;
            let existing = current.get(index);
            let existing_options = existing.map(|q| q.options.as_slice()).unwrap_or(&[]);

            Some(Question {
                id: existing
                    .map(|q| q.id.clone())
                    .unwrap_or_else(|| ids.next_id()),
                text,
                image_url: inherited(obj, &["imageUrl", "image_url"], existing.map(|q| &q.image_url)),
                options: field(obj, &["options", "answers"])
                    .map(|options| normalize_options(options, existing_options, outcome_ids, ids))
                    .unwrap_or_else(|| existing_options.to_vec()),
            })
        })
        .collect();

    (!questions.is_empty()).then_some(questions)
}

fn normalize_options(
    value: &Value,
    current: &[AnswerOption],
    outcome_ids: &HashMap<String, String>,
    ids: &dyn IdGenerator,
) -> Vec<AnswerOption> {
    let Some(items) = value.as_array() else {
        return current.to_vec();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let existing = current.get(index);
            let (text, target) = match item {
                Value::String(_) => (non_empty_text(item)?, None),
                Value::Object(obj) => (
                    text_field(obj, &["text", "label"])?,
                    sanitized_field(
                        obj,
                        &["targetOutcomeId", "target_outcome_id", "outcomeId"],
                    ),
                ),
                _ => return None,
            };

            let target_outcome_id = target
                .map(|id| outcome_ids.get(&id).cloned().unwrap_or(id))
                .or_else(|| existing.map(|o| o.target_outcome_id.clone()))
                .unwrap_or_default();

            Some(AnswerOption {
                id: existing
                    .map(|o| o.id.clone())
                    .unwrap_or_else(|| ids.next_id()),
                text,
                target_outcome_id,
            })
        })
        .collect()
}

fn normalize_outcomes(
    value: &Value,
    current: &[Outcome],
    outcome_ids: &mut HashMap<String, String>,
    ids: &dyn IdGenerator,
) -> Option<Vec<Outcome>> {
    let items = value.as_array()?;

    let mut outcomes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let Some(title) = text_field(obj, &["title", "name"]) else {
            continue;
        };
        let existing = current.get(index);
        let id = existing
            .map(|o| o.id.clone())
            .unwrap_or_else(|| ids.next_id());

        if let Some(claimed) = sanitized_field(obj, &["id"]) {
            outcome_ids.insert(claimed, id.clone());
        }

        outcomes.push(Outcome {
            id,
            title,
            description: inherited(obj, &["description"], existing.map(|o| &o.description)),
            image_url: inherited(obj, &["imageUrl", "image_url"], existing.map(|o| &o.image_url)),
            image_prompt: sanitized_field(obj, &["imagePrompt", "image_prompt"]),
            cta_text: inherited(obj, &["ctaText", "cta_text"], existing.map(|o| &o.cta_text)),
            cta_url: inherited(obj, &["ctaUrl", "cta_url"], existing.map(|o| &o.cta_url)),
        });
    }

    (!outcomes.is_empty()).then_some(outcomes)
}

/// The payload's value if it has one, otherwise what the document already holds.
fn inherited(
    obj: &Map<String, Value>,
    keys: &[&str],
    existing: Option<&Option<String>>,
) -> Option<String> {
    sanitized_field(obj, keys).or_else(|| existing.cloned().flatten())
}

fn normalize_lead_gen(value: &Value) -> Option<LeadGen> {
    let obj = value.as_object()?;
    let text = |keys: &[&str]| sanitized_field(obj, keys).unwrap_or_default();

    let mut fields: Vec<LeadField> = Vec::new();
    if let Some(Value::Array(items)) = field(obj, &["fields"]) {
        for item in items {
            let name = match item {
                Value::String(name) => Some(name.as_str()),
                Value::Object(entry) => entry.get("type").and_then(Value::as_str),
                _ => None,
            };
            if let Some(lead_field) = name.and_then(LeadField::parse) {
                if !fields.contains(&lead_field) {
                    fields.push(lead_field);
                }
            }
        }
    }

    Some(LeadGen {
        enabled: matches!(obj.get("enabled"), Some(Value::Bool(true))),
        title: text(&["title"]),
        description: text(&["description"]),
        fields,
        cta_text: text(&["ctaText", "cta_text"]),
    })
}
