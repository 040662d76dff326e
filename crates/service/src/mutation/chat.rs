use venti_core::{
    ChatMessage, ChatRole, Entry, NewChatMessage, TempId, discard, extract_crisis_marker,
    reconcile,
};
use venti_storage::ChatStore;

use super::{BusyGuard, Mutations};
use crate::deadline::within;
use crate::error::ServiceError;

/// Result of one chat send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub user: ChatMessage,
    /// `None` when no reply could be generated or persisted.
    pub reply: Option<ChatMessage>,
    pub crisis: bool,
}

impl Mutations {
    /// Persist the user's message, ask the companion for a reply and persist that.
    ///
    /// The reply is only requested once the user's message is stored. A second
    /// send while one is in flight is rejected with `Busy`.
    pub async fn send_chat(&self, text: &str) -> Result<ChatExchange, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput("message must not be empty".to_owned()));
        }
        let Some(_busy) = BusyGuard::acquire(&self.chat_busy) else {
            return Err(ServiceError::Busy("chat"));
        };
        let (epoch, user_id) = self.state.active()?;
        let temp = TempId::new();
        let pending = ChatMessage {
            id: 0,
            user_id: user_id.clone(),
            created_at: self.clock.now(),
            role: ChatRole::User,
            text: text.to_owned(),
        };
        let (history, context) = self
            .state
            .update_data(epoch, |data| {
                let history = data.confirmed_chat();
                let context = data.clone();
                data.chat_history.push(Entry::pending(temp, pending));
                (history, context)
            })
            .ok_or(ServiceError::NoSession)?;

        let request = NewChatMessage { user_id: user_id.clone(), role: ChatRole::User, text: text.to_owned() };
        let user = match within(self.timeout, "chat insert", self.store.insert_chat(&request)).await {
            Ok(saved) => {
                self.state
                    .update_data(epoch, |data| reconcile(&mut data.chat_history, temp, saved.clone()));
                saved
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "chat insert failed, rolling back");
                self.state.update_data(epoch, |data| discard(&mut data.chat_history, temp));
                self.notices.error("Sorry, your message could not be sent. Please try again.");
                return Err(e);
            },
        };

        let raw = match within(self.timeout, "companion reply", self.companion.reply(text, &history, &context)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "companion reply failed");
                self.notices.error("Sorry, I couldn't respond right now. Please try again.");
                return Ok(ChatExchange { user, reply: None, crisis: false });
            },
        };

        let clean = extract_crisis_marker(&raw);
        if clean.crisis {
            tracing::info!(user_id, "crisis marker in reply, surfacing SOS resources");
            self.state.trigger_sos(epoch);
        }
        let reply = if clean.text.is_empty() {
            None
        } else {
            self.persist_assistant(epoch, &user_id, clean.text).await
        };
        Ok(ChatExchange { user, reply, crisis: clean.crisis })
    }

    /// Store the companion's opening line when the conversation is empty.
    pub async fn greet_if_empty(&self) -> Result<Option<ChatMessage>, ServiceError> {
        let Some(_busy) = BusyGuard::acquire(&self.chat_busy) else {
            return Ok(None);
        };
        let (epoch, user_id) = self.state.active()?;
        let greeting = self
            .state
            .update_data(epoch, |data| {
                data.chat_history.is_empty().then(|| {
                    let name = data.profile.name.trim();
                    let name = if name.is_empty() { "there" } else { name };
                    format!("Hi {name}, I'm here to listen. What's on your mind today?")
                })
            })
            .ok_or(ServiceError::NoSession)?;
        match greeting {
            Some(text) => Ok(self.persist_assistant(epoch, &user_id, text).await),
            None => Ok(None),
        }
    }

    /// Assistant messages are appended only once stored.
    async fn persist_assistant(&self, epoch: u64, user_id: &str, text: String) -> Option<ChatMessage> {
        let request = NewChatMessage { user_id: user_id.to_owned(), role: ChatRole::Assistant, text };
        match within(self.timeout, "chat insert", self.store.insert_chat(&request)).await {
            Ok(saved) => {
                self.state.update_data(epoch, |data| data.chat_history.push(Entry::confirmed(saved.clone())));
                Some(saved)
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "assistant message not stored");
                self.notices.error("Sorry, your message could not be sent. Please try again.");
                None
            },
        }
    }
}
