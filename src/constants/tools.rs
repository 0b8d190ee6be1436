pub const UPDATE_QUIZ_TOOL: &str = "update_quiz";
pub const GENERATE_COVER_IMAGE_TOOL: &str = "generate_cover_image";
pub const GENERATE_OUTCOME_IMAGE_TOOL: &str = "generate_outcome_image";

/// Bumped whenever a tool's argument shape changes.
pub const TOOL_SCHEMA_VERSION: &str = "2";

pub const KNOWN_TOOLS: &[&str] = &[
    UPDATE_QUIZ_TOOL,
    GENERATE_COVER_IMAGE_TOOL,
    GENERATE_OUTCOME_IMAGE_TOOL,
];

pub fn is_known_tool(name: &str) -> bool {
    KNOWN_TOOLS.contains(&name)
}
