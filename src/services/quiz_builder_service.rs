use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::QuizDocument,
        dto::{
            provider::ProviderResponse, request::CreateQuizRequest,
            response::AssistantReplyResponse,
        },
    },
    repositories::QuizDocumentRepository,
    services::assistant_reply_service::AssistantReplyService,
};

/// Concurrent replies to one quiz retry this many times before giving up.
const MAX_REPLY_ATTEMPTS: u32 = 3;

pub struct QuizBuilderService {
    repository: Arc<dyn QuizDocumentRepository>,
    replies: Arc<AssistantReplyService>,
}

impl QuizBuilderService {
    pub fn new(
        repository: Arc<dyn QuizDocumentRepository>,
        replies: Arc<AssistantReplyService>,
    ) -> Self {
        Self {
            repository,
            replies,
        }
    }

    pub async fn create_quiz(&self, request: CreateQuizRequest) -> AppResult<QuizDocument> {
        request.validate()?;

        let quiz = QuizDocument::new_draft(request.title, request.description);
        let created = self.repository.create(quiz).await?;
        log::info!("created quiz draft {}", created.id);
        Ok(created)
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<QuizDocument> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    /// Runs the reply pipeline against the stored document and persists the
    /// delta. The document is only written when something changed. When another
    /// reply lands first, the pipeline is re-run against the newer document.
    pub async fn apply_assistant_reply(
        &self,
        id: &str,
        response: &ProviderResponse,
    ) -> AppResult<AssistantReplyResponse> {
        let mut attempt = 1;
        loop {
            let mut quiz = self.get_quiz(id).await?;
            let turn = self.replies.process_reply(response, &quiz.snapshot());

            if !quiz.apply_delta(&turn.delta) {
                log::debug!("assistant reply left quiz {} unchanged", id);
                return Ok(AssistantReplyResponse::new(turn, quiz));
            }

            match self.repository.update(quiz).await {
                Ok(stored) => {
                    log::info!("applied assistant reply to quiz {}", id);
                    return Ok(AssistantReplyResponse::new(turn, stored));
                }
                Err(AppError::Conflict(reason)) if attempt < MAX_REPLY_ATTEMPTS => {
                    log::debug!("retrying reply for quiz {} ({}): {}", id, attempt, reason);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
