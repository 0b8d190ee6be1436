use serde::Serialize;

use crate::models::domain::extraction::{ExtractionDelta, ImageRequest};
use crate::models::domain::quiz::QuizDocument;
use crate::services::tool_schema::ToolDefinition;

/// What one assistant reply amounts to: transcript text plus changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantTurn {
    pub text: String,
    pub delta: ExtractionDelta,
    pub image_requests: Vec<ImageRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReplyResponse {
    pub text: String,
    pub delta: ExtractionDelta,
    pub image_requests: Vec<ImageRequest>,
    pub quiz: QuizDocument,
}

impl AssistantReplyResponse {
    pub fn new(turn: AssistantTurn, quiz: QuizDocument) -> Self {
        AssistantReplyResponse {
            text: turn.text,
            delta: turn.delta,
            image_requests: turn.image_requests,
            quiz,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifest {
    pub version: &'static str,
    pub system_prompt: &'static str,
    pub tools: Vec<ToolDefinition>,
}
