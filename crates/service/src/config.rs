//! Environment-driven configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use venti_core::{AuthProvider, env_non_empty, env_parse_with_default};
use venti_llm::{FunctionsClient, LlmClient, LlmError};

/// Default per-call timeout for remote operations.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default lifetime of a transient notice.
pub const DEFAULT_NOTICE_TTL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Applied to every store and collaborator call.
    pub request_timeout: Duration,
    pub notice_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            notice_ttl: Duration::from_millis(DEFAULT_NOTICE_TTL_MS),
        }
    }
}

impl ServiceConfig {
    /// Read `VENTI_REQUEST_TIMEOUT_SECS` and `VENTI_NOTICE_TTL_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_timeout: Duration::from_secs(
                env_parse_with_default("VENTI_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)
                    .max(1),
            ),
            notice_ttl: Duration::from_millis(env_parse_with_default(
                "VENTI_NOTICE_TTL_MS",
                DEFAULT_NOTICE_TTL_MS,
            )),
        }
    }
}

/// Chat-completions endpoint used by the server-side companion.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmSettings {
    /// `None` unless `VENTI_LLM_API_KEY` is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env_non_empty("VENTI_LLM_API_KEY")?;
        Some(Self {
            api_key,
            base_url: env_non_empty("VENTI_LLM_API_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_owned()),
            model: env_non_empty("VENTI_LLM_MODEL")
                .unwrap_or_else(|| venti_llm::DEFAULT_MODEL.to_owned()),
        })
    }

    pub fn client(&self, timeout: Duration) -> Result<LlmClient, LlmError> {
        LlmClient::new(self.api_key.clone(), &self.base_url, self.model.clone(), timeout)
    }
}

/// Where the client-side functions client sends its requests.
#[derive(Clone, PartialEq, Eq)]
pub struct FunctionsSettings {
    pub base_url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for FunctionsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsSettings")
            .field("base_url", &self.base_url)
            .field("anon_key", &"***")
            .finish()
    }
}

impl FunctionsSettings {
    /// `None` unless `VENTI_FUNCTIONS_URL` is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: env_non_empty("VENTI_FUNCTIONS_URL")?,
            anon_key: env_non_empty("VENTI_ANON_KEY").unwrap_or_default(),
        })
    }

    pub fn client(
        &self,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> Result<FunctionsClient, LlmError> {
        FunctionsClient::new(&self.base_url, self.anon_key.clone(), auth, timeout)
    }
}

/// `VENTI_DB_PATH`, or `<data_local_dir>/venti/venti.db`.
#[must_use]
pub fn default_db_path() -> PathBuf {
    env_non_empty("VENTI_DB_PATH").map_or_else(
        || {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("venti")
                .join("venti.db")
        },
        PathBuf::from,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.notice_ttl, Duration::from_millis(3000));
    }

    #[test]
    fn settings_debug_redacts_secrets() {
        let llm = LlmSettings {
            api_key: "sk-secret".to_owned(),
            base_url: "http://x".to_owned(),
            model: "m".to_owned(),
        };
        assert!(!format!("{llm:?}").contains("sk-secret"));
        let functions =
            FunctionsSettings { base_url: "http://x".to_owned(), anon_key: "anon-secret".to_owned() };
        assert!(!format!("{functions:?}").contains("anon-secret"));
    }
}
