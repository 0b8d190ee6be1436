use serde::{Deserialize, Serialize};

use crate::models::domain::lead_gen::LeadGen;
use crate::models::domain::outcome::Outcome;
use crate::models::domain::quiz_question::Question;

/// Sparse change set for a quiz. An absent field means "leave as is",
/// never "clear".
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<Outcome>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_gen: Option<LeadGen>,
}

impl ExtractionDelta {
    /// True when applying this delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Layers `later` over `self`: fields present in `later` win.
    pub fn merge(self, later: ExtractionDelta) -> ExtractionDelta {
        ExtractionDelta {
            title: later.title.or(self.title),
            description: later.description.or(self.description),
            cover_image_url: later.cover_image_url.or(self.cover_image_url),
            cover_image_prompt: later.cover_image_prompt.or(self.cover_image_prompt),
            cta_text: later.cta_text.or(self.cta_text),
            cta_url: later.cta_url.or(self.cta_url),
            questions: later.questions.or(self.questions),
            outcomes: later.outcomes.or(self.outcomes),
            lead_gen: later.lead_gen.or(self.lead_gen),
        }
    }
}

/// Read-only view of the document the delta will be merged into.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentDocumentSnapshot {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    pub questions: Vec<Question>,
    pub outcomes: Vec<Outcome>,
}

/// Imagery the host should fetch or generate.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImageRequest {
    Cover {
        prompt: String,
    },
    Outcome {
        #[serde(rename = "outcomeId")]
        outcome_id: String,
        prompt: String,
    },
}
