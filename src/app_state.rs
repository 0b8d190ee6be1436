use std::sync::Arc;

use crate::{
    config::Config,
    repositories::InMemoryQuizDocumentRepository,
    services::{
        assistant_reply_service::AssistantReplyService, quiz_builder_service::QuizBuilderService,
        response_sanitizer::ResponseSanitizer,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_builder_service: Arc<QuizBuilderService>,
    pub reply_service: Arc<AssistantReplyService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sanitizer =
            ResponseSanitizer::default().with_additional_patterns(&config.extra_leak_patterns);
        let reply_service = Arc::new(AssistantReplyService::new(sanitizer));

        let quiz_repository = Arc::new(InMemoryQuizDocumentRepository::new());
        let quiz_builder_service = Arc::new(QuizBuilderService::new(
            quiz_repository,
            reply_service.clone(),
        ));

        Self {
            quiz_builder_service,
            reply_service,
            config: Arc::new(config),
        }
    }
}
