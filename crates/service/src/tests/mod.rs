//! Shared fixtures: a failure-injecting store over real SQLite, a scripted
//! companion and a signed-in session harness.

mod admin_tests;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{Barrier, Notify};
use venti_core::{
    AuthSession, ChatMessage, ChatRole, Companion, FixedClock, Identity, JournalEntry, MoodEntry,
    NewChatMessage, NewJournalEntry, NewMood, NewStory, PersonaMessage, ProfileFields, RecordId,
    RemoteError, Story, StoryChanges, StoredProfile, UserData,
};
use venti_storage::{
    Account, AccountStore, ChatStore, JournalStore, MoodStore, ProfileStore, Storage,
    StorageError, StoryStore,
};

use crate::{AppSession, LocalAuth, Mutations, ServiceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    GetProfile,
    InsertProfile,
    UpdateProfile,
    DeleteProfile,
    ListJournal,
    ListMoods,
    ListStories,
    ListChat,
    InsertJournal,
    DeleteJournal,
    UpsertMood,
    InsertStory,
    UpdateStory,
    DeleteStory,
    InsertChat,
}

pub(crate) const COLLECTIONS: [Op; 4] = [Op::ListJournal, Op::ListMoods, Op::ListStories, Op::ListChat];

/// Real `Storage` with per-operation failure injection and gates.
pub(crate) struct FlakyStore {
    inner: Arc<Storage>,
    failing: Mutex<HashSet<Op>>,
    holds: Mutex<HashMap<Op, Arc<Notify>>>,
    /// One-shot gates, taken by successive calls before `holds` is consulted.
    queued: Mutex<HashMap<Op, VecDeque<Arc<Notify>>>>,
    /// Callers of `get_profile` that wait for each other after their fetch.
    race: Option<(Arc<Barrier>, AtomicUsize, usize)>,
}

impl FlakyStore {
    pub(crate) fn new(inner: Arc<Storage>) -> Self {
        Self {
            inner,
            failing: Mutex::default(),
            holds: Mutex::default(),
            queued: Mutex::default(),
            race: None,
        }
    }

    /// The first `parties` profile fetches all complete before any returns.
    pub(crate) fn racing(inner: Arc<Storage>, parties: usize) -> Self {
        Self {
            race: Some((Arc::new(Barrier::new(parties)), AtomicUsize::new(0), parties)),
            ..Self::new(inner)
        }
    }

    pub(crate) fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn heal(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Park every future call of `op` until the returned gate is notified.
    pub(crate) fn hold(&self, op: Op) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(op, gate.clone());
        gate
    }

    /// Park only the next call of `op` not already parked by an earlier gate.
    pub(crate) fn hold_next(&self, op: Op) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.queued.lock().unwrap().entry(op).or_default().push_back(gate.clone());
        gate
    }

    async fn enter(&self, op: Op) -> Result<(), StorageError> {
        let queued = self.queued.lock().unwrap().get_mut(&op).and_then(VecDeque::pop_front);
        let gate = queued.or_else(|| self.holds.lock().unwrap().get(&op).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StorageError::Task(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FlakyStore {
    async fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>, StorageError> {
        self.enter(Op::GetProfile).await?;
        let fetched = ProfileStore::get_profile(&*self.inner, id).await;
        if let Some((barrier, seen, parties)) = &self.race {
            if seen.fetch_add(1, Ordering::SeqCst) < *parties {
                barrier.wait().await;
            }
        }
        fetched
    }

    async fn insert_profile(&self, id: &str, fields: &ProfileFields) -> Result<StoredProfile, StorageError> {
        self.enter(Op::InsertProfile).await?;
        ProfileStore::insert_profile(&*self.inner, id, fields).await
    }

    async fn update_profile(&self, id: &str, fields: &ProfileFields) -> Result<StoredProfile, StorageError> {
        self.enter(Op::UpdateProfile).await?;
        ProfileStore::update_profile(&*self.inner, id, fields).await
    }

    async fn list_profiles(&self) -> Result<Vec<StoredProfile>, StorageError> {
        ProfileStore::list_profiles(&*self.inner).await
    }

    async fn delete_profile(&self, id: &str) -> Result<bool, StorageError> {
        self.enter(Op::DeleteProfile).await?;
        ProfileStore::delete_profile(&*self.inner, id).await
    }
}

#[async_trait]
impl JournalStore for FlakyStore {
    async fn list_journal(&self, user_id: &str) -> Result<Vec<JournalEntry>, StorageError> {
        self.enter(Op::ListJournal).await?;
        JournalStore::list_journal(&*self.inner, user_id).await
    }

    async fn insert_journal(&self, entry: &NewJournalEntry) -> Result<JournalEntry, StorageError> {
        self.enter(Op::InsertJournal).await?;
        JournalStore::insert_journal(&*self.inner, entry).await
    }

    async fn delete_journal(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        self.enter(Op::DeleteJournal).await?;
        JournalStore::delete_journal(&*self.inner, user_id, id).await
    }
}

#[async_trait]
impl MoodStore for FlakyStore {
    async fn list_moods(&self, user_id: &str) -> Result<Vec<MoodEntry>, StorageError> {
        self.enter(Op::ListMoods).await?;
        MoodStore::list_moods(&*self.inner, user_id).await
    }

    async fn upsert_mood(&self, mood: &NewMood) -> Result<MoodEntry, StorageError> {
        self.enter(Op::UpsertMood).await?;
        MoodStore::upsert_mood(&*self.inner, mood).await
    }
}

#[async_trait]
impl StoryStore for FlakyStore {
    async fn list_stories(&self, user_id: &str) -> Result<Vec<Story>, StorageError> {
        self.enter(Op::ListStories).await?;
        StoryStore::list_stories(&*self.inner, user_id).await
    }

    async fn insert_story(&self, story: &NewStory) -> Result<Story, StorageError> {
        self.enter(Op::InsertStory).await?;
        StoryStore::insert_story(&*self.inner, story).await
    }

    async fn update_story(
        &self,
        user_id: &str,
        id: RecordId,
        changes: &StoryChanges,
    ) -> Result<Story, StorageError> {
        self.enter(Op::UpdateStory).await?;
        StoryStore::update_story(&*self.inner, user_id, id, changes).await
    }

    async fn delete_story(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        self.enter(Op::DeleteStory).await?;
        StoryStore::delete_story(&*self.inner, user_id, id).await
    }
}

#[async_trait]
impl ChatStore for FlakyStore {
    async fn list_chat(&self, user_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        self.enter(Op::ListChat).await?;
        ChatStore::list_chat(&*self.inner, user_id).await
    }

    async fn insert_chat(&self, message: &NewChatMessage) -> Result<ChatMessage, StorageError> {
        self.enter(Op::InsertChat).await?;
        ChatStore::insert_chat(&*self.inner, message).await
    }
}

#[async_trait]
impl AccountStore for FlakyStore {
    async fn create_account(&self, id: &str, email: Option<&str>) -> Result<Account, StorageError> {
        AccountStore::create_account(&*self.inner, id, email).await
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>, StorageError> {
        AccountStore::get_account(&*self.inner, id).await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        AccountStore::find_account_by_email(&*self.inner, email).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        AccountStore::list_accounts(&*self.inner).await
    }

    async fn issue_token(&self, account_id: &str) -> Result<String, StorageError> {
        AccountStore::issue_token(&*self.inner, account_id).await
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<Account>, StorageError> {
        AccountStore::resolve_token(&*self.inner, token).await
    }

    async fn revoke_token(&self, token: &str) -> Result<bool, StorageError> {
        AccountStore::revoke_token(&*self.inner, token).await
    }
}

/// Companion that answers from a script, echoing once the script runs out.
#[derive(Default)]
pub(crate) struct StubCompanion {
    replies: Mutex<VecDeque<Result<String, RemoteError>>>,
    /// Message and history length of every reply request.
    pub(crate) seen: Mutex<Vec<(String, usize)>>,
    pub(crate) summary_calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl StubCompanion {
    pub(crate) fn script(&self, reply: Result<String, RemoteError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl Companion for StubCompanion {
    async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        _user_data: &UserData,
    ) -> Result<String, RemoteError> {
        self.seen.lock().unwrap().push((message.to_owned(), history.len()));
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("reply to {message}")))
    }

    async fn weekly_summary(
        &self,
        entries: &[JournalEntry],
        moods: &[MoodEntry],
    ) -> Result<String, RemoteError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} entries, {} moods", entries.len(), moods.len()))
    }

    async fn community_reply(
        &self,
        _history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, RemoteError> {
        Ok(vec![PersonaMessage { name: "Maya".to_owned(), text: "We hear you.".to_owned() }])
    }

    async fn community_story(&self, _topic: &str) -> Result<String, RemoteError> {
        Err(RemoteError::Network("offline".to_owned()))
    }
}

pub(crate) fn journal(user_id: &str, content: &str) -> NewJournalEntry {
    NewJournalEntry { user_id: user_id.to_owned(), prompt: None, content: content.to_owned(), mood: 5 }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub(crate) fn mood(user_id: &str, date: &str, mood: u8) -> NewMood {
    NewMood { user_id: user_id.to_owned(), date: date.parse().unwrap(), mood }
}

pub(crate) fn story(user_id: &str, title: &str) -> NewStory {
    NewStory { user_id: user_id.to_owned(), title: title.to_owned(), content: format!("{title} body") }
}

pub(crate) fn chat(user_id: &str, role: ChatRole, text: &str) -> NewChatMessage {
    NewChatMessage { user_id: user_id.to_owned(), role, text: text.to_owned() }
}

/// Poll `cond` until it holds, panicking after about five seconds.
pub(crate) async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

pub(crate) fn test_config() -> ServiceConfig {
    ServiceConfig { request_timeout: Duration::from_secs(5), notice_ttl: Duration::from_secs(60) }
}

pub(crate) struct Harness {
    pub(crate) storage: Arc<Storage>,
    pub(crate) store: Arc<FlakyStore>,
    pub(crate) auth: Arc<LocalAuth>,
    pub(crate) companion: Arc<StubCompanion>,
    pub(crate) clock: Arc<FixedClock>,
    pub(crate) session: Arc<AppSession>,
    _dir: TempDir,
}

pub(crate) fn harness() -> Harness {
    harness_with(&test_config())
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub(crate) fn harness_with(config: &ServiceConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(&dir.path().join("venti.db")).unwrap());
    let store = Arc::new(FlakyStore::new(storage.clone()));
    let auth = Arc::new(LocalAuth::new());
    let companion = Arc::new(StubCompanion::default());
    let clock = Arc::new(FixedClock::on("2024-01-01".parse().unwrap()));
    let session = Arc::new(AppSession::new(
        config,
        auth.clone(),
        store.clone(),
        companion.clone(),
        clock.clone(),
    ));
    Harness { storage, store, auth, companion, clock, session, _dir: dir }
}

impl Harness {
    /// Sign in as `id` and bootstrap its session.
    pub(crate) async fn sign_in(&self, id: &str) -> Identity {
        let identity = Identity::new(id, Some(format!("{id}@example.com")));
        self.auth.sign_in(AuthSession { access_token: format!("token-{id}"), identity: identity.clone() });
        self.session.bootstrap(&identity).await;
        identity
    }

    #[expect(clippy::unwrap_used, reason = "test code")]
    pub(crate) fn data(&self) -> UserData {
        self.session.state().user_data().unwrap()
    }

    pub(crate) fn mutations(&self) -> &Mutations {
        self.session.mutations()
    }

    pub(crate) fn last_notice(&self) -> Option<String> {
        self.session.notices().active().pop().map(|n| n.message)
    }
}
