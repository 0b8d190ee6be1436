pub mod extraction;
pub mod lead_gen;
pub mod outcome;
pub mod quiz;
pub mod quiz_question;
pub use extraction::{CurrentDocumentSnapshot, ExtractionDelta, ImageRequest};
pub use lead_gen::{LeadField, LeadGen};
pub use outcome::Outcome;
pub use quiz::QuizDocument;
pub use quiz_question::{AnswerOption, Question};
