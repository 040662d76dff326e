use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use venti_core::{AuthError, AuthEvent, AuthProvider, AuthSession, Identity, Profile, UserData};

use crate::client::LlmClient;

mod retry_tests;

#[expect(clippy::unwrap_used, reason = "test code")]
pub(crate) fn test_client(uri: &str) -> LlmClient {
    LlmClient::new("test-key".to_owned(), uri, "test-model".to_owned(), Duration::from_secs(5))
        .unwrap()
        .with_retry_backoff(Duration::from_millis(1))
}

pub(crate) fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "content": content, "role": "assistant" } }]
    })
}

pub(crate) fn sample_user_data() -> UserData {
    let mut profile = Profile::defaults("u1");
    profile.name = "sam".to_owned();
    UserData::assemble("u1", profile.to_fields(), venti_core::Collections::default())
}

/// Auth provider with a fixed (or absent) session.
pub(crate) struct StaticAuth {
    session: Option<AuthSession>,
    events: broadcast::Sender<AuthEvent>,
}

impl StaticAuth {
    pub(crate) fn signed_in(token: &str) -> Self {
        let session = AuthSession {
            access_token: token.to_owned(),
            identity: Identity::new("u1", Some("sam@example.com".to_owned())),
        };
        Self { session: Some(session), events: broadcast::channel(4).0 }
    }

    pub(crate) fn signed_out() -> Self {
        Self { session: None, events: broadcast::channel(4).0 }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
