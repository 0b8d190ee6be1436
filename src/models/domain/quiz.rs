use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::extraction::{CurrentDocumentSnapshot, ExtractionDelta};
use crate::models::domain::lead_gen::LeadGen;
use crate::models::domain::outcome::Outcome;
use crate::models::domain::quiz_question::Question;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    pub questions: Vec<Question>,
    pub outcomes: Vec<Outcome>,
    pub lead_gen: Option<LeadGen>,
    /// Bumped by the repository on every stored write.
    #[serde(default)]
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl QuizDocument {
    pub fn new_draft(title: Option<String>, description: Option<String>) -> Self {
        QuizDocument {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            cover_image_url: None,
            cta_text: None,
            cta_url: None,
            questions: Vec::new(),
            outcomes: Vec::new(),
            lead_gen: None,
            version: 0,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn snapshot(&self) -> CurrentDocumentSnapshot {
        CurrentDocumentSnapshot {
            title: self.title.clone(),
            description: self.description.clone(),
            cover_image_url: self.cover_image_url.clone(),
            cta_text: self.cta_text.clone(),
            cta_url: self.cta_url.clone(),
            questions: self.questions.clone(),
            outcomes: self.outcomes.clone(),
        }
    }

    /// Overwrites every field present in `delta`. Returns whether anything changed.
    pub fn apply_delta(&mut self, delta: &ExtractionDelta) -> bool {
        let before = self.clone();

        if let Some(title) = &delta.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &delta.description {
            self.description = Some(description.clone());
        }
        if let Some(url) = &delta.cover_image_url {
            self.cover_image_url = Some(url.clone());
        }
        if let Some(cta_text) = &delta.cta_text {
            self.cta_text = Some(cta_text.clone());
        }
        if let Some(cta_url) = &delta.cta_url {
            self.cta_url = Some(cta_url.clone());
        }
        if let Some(questions) = &delta.questions {
            self.questions = questions.clone();
        }
        if let Some(outcomes) = &delta.outcomes {
            // prompts are requests for the image pipeline, not document state
            self.outcomes = outcomes
                .iter()
                .cloned()
                .map(|outcome| Outcome {
                    image_prompt: None,
                    ..outcome
                })
                .collect();
        }
        if let Some(lead_gen) = &delta.lead_gen {
            self.lead_gen = Some(lead_gen.clone());
        }

        let changed = *self != before;
        if changed {
            self.modified_at = Some(Utc::now());
        }
        changed
    }
}
