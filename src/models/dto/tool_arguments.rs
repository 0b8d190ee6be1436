use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments of `update_quiz`. Every field is optional: the model sends only
/// what it wants to change.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizArguments {
    /// Quiz title shown on the cover.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Direct link to a cover image. Leave empty when you only have an idea for one.
    pub cover_image_url: Option<String>,
    /// Describe the cover image to generate.
    pub cover_image_prompt: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    /// The complete question list, in order.
    pub questions: Option<Vec<QuestionArguments>>,
    /// The complete outcome list, in order.
    pub outcomes: Option<Vec<OutcomeArguments>>,
    pub lead_gen: Option<LeadGenArguments>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionArguments {
    pub text: String,
    pub image_url: Option<String>,
    pub options: Vec<OptionArguments>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionArguments {
    pub text: String,
    /// Id of the outcome this answer counts toward.
    pub target_outcome_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeArguments {
    /// Short stable id so options can point at this outcome.
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Describe the outcome image to generate.
    pub image_prompt: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadGenArguments {
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Any of "name", "email", "phone".
    pub fields: Option<Vec<String>>,
    pub cta_text: Option<String>,
}

/// Arguments of `generate_cover_image`.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CoverImageArguments {
    /// What the cover should show.
    pub prompt: String,
}

/// Arguments of `generate_outcome_image`.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeImageArguments {
    #[serde(alias = "outcome_id")]
    pub outcome_id: String,
    pub prompt: String,
}
