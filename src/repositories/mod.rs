pub mod quiz_document_repository;

pub use quiz_document_repository::{InMemoryQuizDocumentRepository, QuizDocumentRepository};

#[cfg(test)]
pub use quiz_document_repository::MockQuizDocumentRepository;
