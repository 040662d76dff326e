use serde::{Deserialize, Serialize};
use venti_core::PersonaMessage;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    #[must_use]
    pub fn json_object() -> Self {
        Self { format_type: "json_object".to_owned() }
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self { role: role.to_owned(), content: content.into() }
    }
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: String,
}

/// Community reply as the model returns it: a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CommunityJson {
    List(Vec<PersonaMessage>),
    Wrapped { messages: Vec<PersonaMessage> },
}

impl CommunityJson {
    pub(crate) fn into_messages(self) -> Vec<PersonaMessage> {
        match self {
            Self::List(messages) | Self::Wrapped { messages } => messages,
        }
    }
}
