use serde::Deserialize;
use validator::Validate;

use crate::models::domain::extraction::CurrentDocumentSnapshot;
use crate::models::dto::provider::ProviderReply;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Stateless extraction: the caller owns the document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub response: ProviderReply,
    #[serde(default)]
    pub current: CurrentDocumentSnapshot,
}
