//! Transient, self-dismissing user notices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug)]
struct Live {
    notice: Notice,
    expires_at: Instant,
}

/// Notices expire `ttl` after they are posted; subscribers see each one once.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    next_id: AtomicU64,
    live: Mutex<Vec<Live>>,
    tx: broadcast::Sender<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { ttl, next_id: AtomicU64::new(1), live: Mutex::new(Vec::new()), tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn post(&self, level: NoticeLevel, message: impl Into<String>) -> Notice {
        let notice = Notice {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
        };
        match level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::debug!(message = %notice.message, "notice");
            },
        }
        let now = Instant::now();
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.retain(|l| l.expires_at > now);
        live.push(Live { notice: notice.clone(), expires_at: now + self.ttl });
        drop(live);
        // No subscribers is fine; the notice is still listed by `active`.
        let _ = self.tx.send(notice.clone());
        notice
    }

    pub fn success(&self, message: impl Into<String>) -> Notice {
        self.post(NoticeLevel::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notice {
        self.post(NoticeLevel::Error, message)
    }

    /// Unexpired notices, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.retain(|l| l.expires_at > now);
        live.iter().map(|l| l.notice.clone()).collect()
    }

    pub fn dismiss(&self, id: u64) {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).retain(|l| l.notice.id != id);
    }

    pub fn clear(&self) {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_expire_after_ttl() {
        let board = NoticeBoard::new(Duration::from_millis(20));
        board.error("Error logging mood. Please try again.");
        assert_eq!(board.active().len(), 1);
        std::thread::sleep(Duration::from_millis(40));
        assert!(board.active().is_empty());
    }

    #[test]
    fn posting_drops_expired_notices() {
        let board = NoticeBoard::new(Duration::from_millis(20));
        board.error("first");
        std::thread::sleep(Duration::from_millis(40));
        board.success("second");
        assert_eq!(board.live.lock().unwrap().len(), 1);
    }

    #[test]
    fn dismiss_removes_one() {
        let board = NoticeBoard::new(Duration::from_secs(60));
        let first = board.success("one");
        board.success("two");
        board.dismiss(first.id);
        let messages: Vec<_> = board.active().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["two"]);
    }

    #[tokio::test]
    async fn subscribers_receive_posts() {
        let board = NoticeBoard::new(Duration::from_secs(1));
        let mut rx = board.subscribe();
        board.error("boom");
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "boom");
    }
}
