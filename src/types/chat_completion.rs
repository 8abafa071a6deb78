use serde::{Deserialize, Serialize};

use crate::types::message::{Message, Role};
use crate::types::model::Model;

/// Parameters for a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionParams {
    /// The model to use for generating the response.
    pub model: Model,

    /// The ordered conversation to complete.
    pub messages: Vec<Message>,

    /// Whether the response should be delivered as a token stream.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ChatCompletionParams {
    /// Create non-streaming parameters.
    pub fn new(model: Model, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            stream: false,
        }
    }

    /// Create streaming parameters.
    pub fn new_streaming(model: Model, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            stream: true,
        }
    }
}

/// Token accounting returned with a completion.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiUsage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Tokens produced in the completion.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Sum of prompt and completion tokens.
    #[serde(default)]
    pub total_tokens: u64,
}

/// One alternative completion in a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The completed assistant message.
    pub message: Message,

    /// Why generation stopped, when reported.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A non-streaming chat-completion response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// The completions generated for the request.
    pub choices: Vec<Choice>,

    /// Token accounting, when reported.
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

impl ChatCompletion {
    /// The assistant message of the first choice, if present.
    pub fn message(&self) -> Option<&Message> {
        self.choices.first().map(|choice| &choice.message)
    }

    /// The content of the first choice, if present.
    pub fn content(&self) -> Option<&str> {
        self.message().map(|message| message.content.as_str())
    }
}

/// The incremental portion of a streamed choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Delta {
    /// Role, present on the first chunk of a stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Content fragment carried by this chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One alternative in a streamed chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The incremental payload.
    #[serde(default)]
    pub delta: Delta,

    /// Why generation stopped, present on the final chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One server-sent event of a streamed chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// The streamed choices.
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// The content fragment of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}
