pub mod assistant_reply_service;
pub mod extraction_normalizer;
pub mod json_repair;
pub mod pattern_table;
pub mod quiz_builder_service;
pub mod response_sanitizer;
pub mod tool_call_extractor;
pub mod tool_schema;
