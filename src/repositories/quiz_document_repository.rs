use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizDocument,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizDocumentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizDocument>>;
    async fn create(&self, quiz: QuizDocument) -> AppResult<QuizDocument>;
    /// Stores `quiz` only if the stored copy still has `quiz.version`, then
    /// bumps the version. A stale write fails with `AppError::Conflict`.
    async fn update(&self, quiz: QuizDocument) -> AppResult<QuizDocument>;
}

/// Process-local store. Documents live as long as the server does.
#[derive(Clone, Default)]
pub struct InMemoryQuizDocumentRepository {
    quizzes: Arc<RwLock<HashMap<String, QuizDocument>>>,
}

impl InMemoryQuizDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizDocumentRepository for InMemoryQuizDocumentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizDocument>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(id).cloned())
    }

    async fn create(&self, quiz: QuizDocument) -> AppResult<QuizDocument> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id) {
            return Err(AppError::AlreadyExists(format!("Quiz with id '{}'", quiz.id)));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn update(&self, quiz: QuizDocument) -> AppResult<QuizDocument> {
        let mut quizzes = self.quizzes.write().await;
        match quizzes.get_mut(&quiz.id) {
            Some(existing) if existing.version != quiz.version => Err(AppError::Conflict(format!(
                "Quiz '{}' changed since version {}",
                quiz.id, quiz.version
            ))),
            Some(existing) => {
                let mut stored = quiz;
                stored.version += 1;
                *existing = stored.clone();
                Ok(stored)
            }
            None => Err(AppError::NotFound(format!("Quiz with id '{}' not found", quiz.id))),
        }
    }
}
