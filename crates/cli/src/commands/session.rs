//! Commands that run a full local session for one account.

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use venti_core::{
    AuthProvider, ChatMessage, Companion, JournalEntry, MoodEntry, PersonaMessage, Program,
    RemoteError, SystemClock, UserData,
};
use venti_service::{
    AppSession, FunctionsSettings, LlmSettings, LocalAuth, NoticeLevel, ServiceConfig,
    SessionPhase, TaskOutcome,
};
use venti_storage::{AccountStore, RecordStore};

use crate::open_storage;

/// Stands in when neither a function server nor an LLM key is configured.
struct Offline;

fn offline() -> RemoteError {
    RemoteError::Service { status: 503, message: "AI companion is not configured".to_owned() }
}

#[async_trait]
impl Companion for Offline {
    async fn reply(
        &self,
        _message: &str,
        _history: &[ChatMessage],
        _user_data: &UserData,
    ) -> Result<String, RemoteError> {
        Err(offline())
    }

    async fn weekly_summary(
        &self,
        _entries: &[JournalEntry],
        _moods: &[MoodEntry],
    ) -> Result<String, RemoteError> {
        Err(offline())
    }

    async fn community_reply(
        &self,
        _history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, RemoteError> {
        Err(offline())
    }

    async fn community_story(&self, _topic: &str) -> Result<String, RemoteError> {
        Err(offline())
    }
}

/// Function server first, then a direct LLM key, else offline.
fn companion(auth: &Arc<dyn AuthProvider>, config: &ServiceConfig) -> Result<Arc<dyn Companion>> {
    if let Some(functions) = FunctionsSettings::from_env() {
        tracing::debug!(base_url = %functions.base_url, "using function server companion");
        return Ok(Arc::new(functions.client(Arc::clone(auth), config.request_timeout)?));
    }
    if let Some(llm) = LlmSettings::from_env() {
        return Ok(Arc::new(llm.client(config.request_timeout)?));
    }
    Ok(Arc::new(Offline))
}

async fn open(token: &str) -> Result<AppSession> {
    let config = ServiceConfig::from_env();
    let storage = open_storage()?;
    let local = LocalAuth::with_accounts(Arc::clone(&storage) as Arc<dyn AccountStore>);
    local.sign_in_with_token(token).await?;
    let auth: Arc<dyn AuthProvider> = Arc::new(local);

    let companion = companion(&auth, &config)?;
    let session = AppSession::new(
        &config,
        auth,
        storage as Arc<dyn RecordStore>,
        companion,
        Arc::new(SystemClock),
    );
    match session.initialize().await {
        SessionPhase::Ready => Ok(session),
        SessionPhase::Failed { failure } => bail!("{}", failure.message()),
        other => bail!("session did not start: {other:?}"),
    }
}

/// Print whatever feedback the last operation posted.
fn report(session: &AppSession) {
    for notice in session.notices().active() {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        }
    }
}

pub(crate) async fn bundle(token: &str) -> Result<()> {
    let session = open(token).await?;
    let data = session.state().user_data();
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

pub(crate) async fn mood(token: &str, mood: u8, date: Option<NaiveDate>) -> Result<()> {
    let session = open(token).await?;
    let result = match date {
        Some(date) => session.mutations().log_mood(date, mood).await,
        None => session.mutations().log_mood_today(mood).await,
    };
    report(&session);
    result?;
    Ok(())
}

pub(crate) async fn task(token: &str) -> Result<()> {
    let session = open(token).await?;
    let outcome = session.mutations().complete_task().await;
    report(&session);
    match outcome? {
        TaskOutcome::Completed(profile) => println!("Day {} of 30", profile.program_day),
        TaskOutcome::AlreadyCompleted => println!("Today's task is already done."),
    }
    Ok(())
}

pub(crate) async fn program(token: &str, program: Program) -> Result<()> {
    let session = open(token).await?;
    let result = session.mutations().select_program(program).await;
    report(&session);
    let profile = result?;
    println!("Started {program} at day {}", profile.program_day);
    Ok(())
}

pub(crate) async fn journal(
    token: &str,
    content: &str,
    prompt: Option<String>,
    mood: u8,
) -> Result<()> {
    let session = open(token).await?;
    let result = session.mutations().add_journal_entry(prompt, content, mood).await;
    report(&session);
    result?;
    Ok(())
}

pub(crate) async fn chat(token: &str, message: &str) -> Result<()> {
    let session = open(token).await?;
    let exchange = session.mutations().send_chat(message).await;
    report(&session);
    let exchange = exchange?;
    if let Some(reply) = exchange.reply {
        println!("{}", reply.text);
    }
    if session.snapshot().sos_visible {
        println!("You are not alone. Help is available 24/7: call or text 988.");
        let contact = session.state().user_data().and_then(|d| d.profile.emergency_contact);
        if let Some(contact) = contact {
            println!("Your emergency contact: {} ({})", contact.name, contact.phone);
        }
    }
    Ok(())
}

pub(crate) async fn summary(token: &str) -> Result<()> {
    let session = open(token).await?;
    let text = session.mutations().weekly_summary().await;
    report(&session);
    println!("{}", text?);
    Ok(())
}

pub(crate) async fn reset(token: &str) -> Result<()> {
    let session = open(token).await?;
    let result = session.reset_account().await;
    report(&session);
    result?;
    Ok(())
}
