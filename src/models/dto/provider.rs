use serde::{Deserialize, Serialize};

/// One assistant turn as the pipeline sees it: free text plus named calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<String>,
}

impl ProviderResponse {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_call(mut self, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        self.tool_calls.push(ToolInvocation {
            name: name.into(),
            arguments: Some(arguments.into()),
        });
        self
    }
}

// OpenAI-compatible chat completion body. Only the fields the pipeline reads
// are modelled; everything else is ignored.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatToolCall {
    pub function: ChatFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<String>,
}

impl From<ChatCompletion> for ProviderResponse {
    fn from(completion: ChatCompletion) -> Self {
        let Some(choice) = completion.choices.into_iter().next() else {
            return ProviderResponse::default();
        };

        ProviderResponse {
            content: choice.message.content,
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolInvocation {
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        }
    }
}

/// Request bodies may carry either a raw chat completion or the flattened form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderReply {
    Completion(ChatCompletion),
    Flattened(ProviderResponse),
}

impl From<ProviderReply> for ProviderResponse {
    fn from(reply: ProviderReply) -> Self {
        match reply {
            ProviderReply::Completion(completion) => completion.into(),
            ProviderReply::Flattened(response) => response,
        }
    }
}
