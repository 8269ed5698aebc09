//! Transient user notices
//!
//! At most one notice per kind; posting replaces the previous one. A notice
//! disappears on its own once its lifetime elapses.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Operation succeeded
    Success,
    /// Degraded but usable
    Warning,
    /// Operation failed
    Error,
}

/// A posted notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
    posted_at: Instant,
    ttl: Duration,
}

impl Notice {
    /// Severity
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Text shown to the user
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the notice stops being shown
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.posted_at + self.ttl
    }

    /// Whether the notice has expired at `now`
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

/// Current notices, one slot per kind
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: BTreeMap<NoticeKind, Notice>,
}

impl NoticeBoard {
    /// Create empty board
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a notice, replacing any notice of the same kind
    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>, ttl: Duration) {
        let notice = Notice {
            kind,
            message: message.into(),
            posted_at: Instant::now(),
            ttl,
        };
        self.notices.insert(kind, notice);
    }

    /// Visible notice of `kind`
    #[must_use]
    pub fn active(&self, kind: NoticeKind) -> Option<&Notice> {
        self.active_at(kind, Instant::now())
    }

    /// Visible notice of `kind` at `now`
    #[must_use]
    pub fn active_at(&self, kind: NoticeKind, now: Instant) -> Option<&Notice> {
        self.notices.get(&kind).filter(|notice| !notice.is_expired_at(now))
    }

    /// Remove the notice of `kind`
    pub fn dismiss(&mut self, kind: NoticeKind) -> Option<Notice> {
        self.notices.remove(&kind)
    }

    /// Drop expired notices
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.notices.retain(|_, notice| !notice.is_expired_at(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notice_expires_after_ttl() {
        let mut board = NoticeBoard::new();
        board.post(NoticeKind::Error, "boom", Duration::from_secs(5));

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert_eq!(board.active(NoticeKind::Error).map(Notice::message), Some("boom"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(board.active(NoticeKind::Error).is_none());

        board.prune();
        assert!(board.dismiss(NoticeKind::Error).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn posting_replaces_and_restarts() {
        let mut board = NoticeBoard::new();
        board.post(NoticeKind::Success, "first", Duration::from_secs(3));
        tokio::time::advance(Duration::from_secs(2)).await;
        board.post(NoticeKind::Success, "second", Duration::from_secs(3));
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(board.active(NoticeKind::Success).map(Notice::message), Some("second"));
        assert!(board.active(NoticeKind::Warning).is_none());
    }

    #[tokio::test]
    async fn dismiss_removes_notice() {
        let mut board = NoticeBoard::new();
        board.post(NoticeKind::Warning, "careful", Duration::from_secs(5));
        assert_eq!(board.dismiss(NoticeKind::Warning).map(|n| n.kind()), Some(NoticeKind::Warning));
        assert!(board.active(NoticeKind::Warning).is_none());
    }
}
