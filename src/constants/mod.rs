pub mod patterns;
pub mod prompts;
pub mod tools;
