//! Client for the serverless function endpoints (`{base}/functions/v1/{name}`).
//!
//! Every call carries the caller's bearer token and the public anon key;
//! non-success responses carry `{"error": message}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use venti_core::{
    AdminApi, AdminUserView, AuthProvider, ChatMessage, Companion, JournalEntry, MoodEntry,
    PersonaMessage, RemoteError, Role, RoleChangeRequest, UserData,
};

use crate::client::truncate;
use crate::error::LlmError;

pub const GET_USER_DATA_BUNDLE: &str = "get-user-data-bundle";
pub const ADMIN_GET_USERS: &str = "admin-get-users";
pub const ADMIN_UPDATE_ROLE: &str = "admin-update-role";
pub const GET_AI_RESPONSE: &str = "get-ai-response";
pub const GET_AI_WEEKLY_SUMMARY: &str = "get-ai-weekly-summary";
pub const GET_AI_COMMUNITY_CHAT: &str = "get-ai-community-chat";
pub const GET_AI_COMMUNITY_STORY: &str = "get-ai-community-story";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponseRequest {
    pub new_message: String,
    pub history: Vec<ChatMessage>,
    pub user_data: UserData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummaryRequest {
    pub entries: Vec<JournalEntry>,
    pub moods: Vec<MoodEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityChatRequest {
    pub history: Vec<PersonaMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityStoryRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<AdminUserView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
struct Empty {}

/// Map a failed function response to the collaborator error taxonomy.
fn status_error(status: u16, message: String) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Unauthorized(message),
        400 | 404 | 409 | 422 => RemoteError::Rejected(message),
        _ => RemoteError::Service { status, message },
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() { RemoteError::Timeout } else { RemoteError::Network(err.to_string()) }
}

pub struct FunctionsClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    auth: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for FunctionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"***")
            .finish_non_exhaustive()
    }
}

impl FunctionsClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        anon_key: String,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned(), anon_key, auth })
    }

    /// POST `body` to the named function as the current session.
    ///
    /// # Errors
    /// `NotAuthenticated` without a session, `Unauthorized`/`Rejected`/`Service`
    /// for error statuses, `Timeout`/`Network` for transport failures and
    /// `InvalidResponse` for an undecodable body.
    pub async fn invoke<B, R>(&self, name: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let session = self
            .auth
            .current_session()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?
            .ok_or(RemoteError::NotAuthenticated)?;

        let response = self
            .client
            .post(format!("{}/functions/v1/{name}", self.base_url))
            .bearer_auth(&session.access_token)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text).map_or_else(
                |_| format!("Function invocation failed with status {}", status.as_u16()),
                |b| b.error,
            );
            tracing::warn!(function = name, status = status.as_u16(), %message, "Function call failed");
            return Err(status_error(status.as_u16(), message));
        }

        serde_json::from_str(&text).map_err(|e| {
            RemoteError::InvalidResponse(format!("{name}: {e} (body: {})", truncate(&text, 200)))
        })
    }

    /// Server-assembled aggregate for the current session.
    ///
    /// # Errors
    /// See [`FunctionsClient::invoke`].
    pub async fn fetch_bundle(&self) -> Result<UserData, RemoteError> {
        self.invoke(GET_USER_DATA_BUNDLE, &Empty {}).await
    }
}

#[async_trait]
impl Companion for FunctionsClient {
    async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        user_data: &UserData,
    ) -> Result<String, RemoteError> {
        let body = AiResponseRequest {
            new_message: message.to_owned(),
            history: history.to_vec(),
            user_data: user_data.clone(),
        };
        let resp: TextResponse = self.invoke(GET_AI_RESPONSE, &body).await?;
        Ok(resp.text)
    }

    async fn weekly_summary(
        &self,
        entries: &[JournalEntry],
        moods: &[MoodEntry],
    ) -> Result<String, RemoteError> {
        let body = WeeklySummaryRequest { entries: entries.to_vec(), moods: moods.to_vec() };
        let resp: TextResponse = self.invoke(GET_AI_WEEKLY_SUMMARY, &body).await?;
        Ok(resp.text)
    }

    async fn community_reply(
        &self,
        history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, RemoteError> {
        let body = CommunityChatRequest { history: history.to_vec() };
        self.invoke(GET_AI_COMMUNITY_CHAT, &body).await
    }

    async fn community_story(&self, topic: &str) -> Result<String, RemoteError> {
        let body = CommunityStoryRequest { topic: topic.to_owned() };
        let resp: TextResponse = self.invoke(GET_AI_COMMUNITY_STORY, &body).await?;
        Ok(resp.text)
    }
}

#[async_trait]
impl AdminApi for FunctionsClient {
    async fn list_users(&self) -> Result<Vec<AdminUserView>, RemoteError> {
        let resp: UsersResponse = self.invoke(ADMIN_GET_USERS, &Empty {}).await?;
        Ok(resp.users)
    }

    async fn update_role(&self, target_user_id: &str, new_role: Role) -> Result<(), RemoteError> {
        let body = RoleChangeRequest { target_user_id: target_user_id.to_owned(), new_role };
        let resp: SuccessResponse = self.invoke(ADMIN_UPDATE_ROLE, &body).await?;
        if resp.success {
            Ok(())
        } else {
            Err(RemoteError::InvalidResponse("role update reported no success".to_owned()))
        }
    }
}
