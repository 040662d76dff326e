//! Server-side `Companion` backed directly by the chat-completions API.

use async_trait::async_trait;
use venti_core::constants::{COMMUNITY_PERSONAS, MAX_COMMUNITY_MESSAGES};
use venti_core::{
    ChatMessage, Companion, JournalEntry, MoodEntry, PersonaMessage, RemoteError,
    UserData,
};

use crate::ai_types::{ChatRequest, CommunityJson, Message, ResponseFormat};
use crate::client::{LlmClient, strip_markdown_json, truncate};
use crate::error::LlmError;
use crate::prompts;

/// Keep known personas only, at most three, and require at least one.
pub(crate) fn sanitize_personas(messages: Vec<PersonaMessage>) -> Result<Vec<PersonaMessage>, LlmError> {
    let kept: Vec<PersonaMessage> = messages
        .into_iter()
        .filter(|m| COMMUNITY_PERSONAS.contains(&m.name.as_str()) && !m.text.trim().is_empty())
        .take(MAX_COMMUNITY_MESSAGES)
        .collect();
    if kept.is_empty() {
        return Err(LlmError::Unexpected("community reply had no persona messages".to_owned()));
    }
    Ok(kept)
}

impl LlmClient {
    fn request(&self, messages: Vec<Message>, json: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            response_format: json.then(ResponseFormat::json_object),
        }
    }

    async fn complete_text(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let text = self.chat_completion(&self.request(messages, false)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_owned())
    }

    async fn community_messages(
        &self,
        history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, LlmError> {
        let prompt = prompts::community_prompt(history);
        let raw = self.chat_completion(&self.request(vec![Message::new("user", prompt)], true)).await?;
        let content = strip_markdown_json(&raw);
        let parsed: CommunityJson = serde_json::from_str(content).map_err(|e| LlmError::JsonParse {
            context: format!("community reply (content: {})", truncate(content, 200)),
            source: e,
        })?;
        sanitize_personas(parsed.into_messages())
    }
}

#[async_trait]
impl Companion for LlmClient {
    async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        user_data: &UserData,
    ) -> Result<String, RemoteError> {
        let mut messages = Vec::with_capacity(history.len().saturating_add(2));
        messages.push(Message::new("system", prompts::companion_system_prompt(user_data)));
        messages.extend(history.iter().map(|m| Message::new(m.role.as_str(), m.text.clone())));
        messages.push(Message::new("user", message));

        tracing::debug!(history = history.len(), "Requesting companion reply");
        Ok(self.complete_text(messages).await?)
    }

    async fn weekly_summary(
        &self,
        entries: &[JournalEntry],
        moods: &[MoodEntry],
    ) -> Result<String, RemoteError> {
        let prompt = prompts::weekly_summary_prompt(entries, moods);
        Ok(self.complete_text(vec![Message::new("user", prompt)]).await?)
    }

    async fn community_reply(
        &self,
        history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, RemoteError> {
        Ok(self.community_messages(history).await?)
    }

    async fn community_story(&self, topic: &str) -> Result<String, RemoteError> {
        let prompt = prompts::community_story_prompt(topic);
        Ok(self.complete_text(vec![Message::new("user", prompt)]).await?)
    }
}
