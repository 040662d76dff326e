//! Migration v1: accounts, profiles and the four per-user collections.

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS access_tokens (
    token TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_access_tokens_account ON access_tokens(account_id);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    name TEXT,
    role TEXT CHECK (role IS NULL OR role IN ('user', 'admin', 'superadmin')),
    onboarding_complete INTEGER,
    anonymous_display_name TEXT,
    breakup_context TEXT,
    chapter_name TEXT,
    shield_list TEXT,
    baseline TEXT,
    program TEXT,
    program_day INTEGER,
    last_task_completed_date TEXT,
    streaks TEXT,
    emergency_contact TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS journal_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    prompt TEXT,
    content TEXT NOT NULL,
    mood INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_journal_user_created ON journal_entries(user_id, created_at);

CREATE TABLE IF NOT EXISTS moods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    date TEXT NOT NULL,
    mood INTEGER NOT NULL,
    UNIQUE (user_id, date)
);

CREATE TABLE IF NOT EXISTS my_stories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stories_user_updated ON my_stories(user_id, updated_at);

CREATE TABLE IF NOT EXISTS chat_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
    text TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chat_user_created ON chat_history(user_id, created_at);
";
