//! Function definitions advertised to the model, generated from the same
//! argument types the pipeline reads back.

use schemars::{schema_for, JsonSchema};
use serde::Serialize;
use serde_json::Value;

use crate::constants::tools::{
    GENERATE_COVER_IMAGE_TOOL, GENERATE_OUTCOME_IMAGE_TOOL, UPDATE_QUIZ_TOOL,
};
use crate::models::dto::tool_arguments::{
    CoverImageArguments, OutcomeImageArguments, UpdateQuizArguments,
};

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        function::<UpdateQuizArguments>(
            UPDATE_QUIZ_TOOL,
            "Create or change the quiz. Send only the fields that change; lists are sent whole.",
        ),
        function::<CoverImageArguments>(
            GENERATE_COVER_IMAGE_TOOL,
            "Request a generated cover image for the quiz.",
        ),
        function::<OutcomeImageArguments>(
            GENERATE_OUTCOME_IMAGE_TOOL,
            "Request a generated image for one outcome.",
        ),
    ]
}

fn function<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolDefinition {
    ToolDefinition {
        kind: "function",
        function: FunctionDefinition {
            name,
            description,
            parameters: parameters_schema::<T>(),
        },
    }
}

fn parameters_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
    }
    value
}
