pub mod assistant_handler;
pub mod quiz_handler;

pub use assistant_handler::{extract_reply, health_check, list_tools};
pub use quiz_handler::{apply_assistant_reply, create_quiz, get_quiz};
