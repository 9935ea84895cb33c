//! Transient user-facing notices
//!
//! Every failure at the session boundary ends up here instead of propagating.
//! Notices expire after a fixed lifetime and are pruned lazily.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.raised_at >= ttl
    }
}

#[derive(Debug, Clone)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::seconds(5))
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.push_at(level, message, Utc::now());
    }

    pub fn push_at(&mut self, level: NoticeLevel, message: impl Into<String>, now: DateTime<Utc>) {
        self.prune(now);
        self.notices.push(Notice {
            level,
            message: message.into(),
            raised_at: now,
        });
    }

    /// Notices still visible at `now`, oldest first
    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notice> {
        let ttl = self.ttl;
        self.notices.iter().filter(move |n| !n.is_expired(now, ttl))
    }

    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.notices.retain(|n| !n.is_expired(now, ttl));
    }

    /// Most recent notice, expired or not
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_expire() {
        let start = Utc::now();
        let mut board = NoticeBoard::new(Duration::seconds(5));
        board.push_at(NoticeLevel::Warning, "first", start);
        board.push_at(NoticeLevel::Error, "second", start + Duration::seconds(3));

        assert_eq!(board.active(start + Duration::seconds(4)).count(), 2);

        let later: Vec<_> = board
            .active(start + Duration::seconds(6))
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(later, vec!["second"]);
        assert_eq!(board.active(start + Duration::seconds(8)).count(), 0);
    }

    #[test]
    fn test_push_prunes_expired() {
        let start = Utc::now();
        let mut board = NoticeBoard::new(Duration::seconds(5));
        board.push_at(NoticeLevel::Info, "old", start);
        board.push_at(NoticeLevel::Success, "new", start + Duration::seconds(10));

        assert_eq!(board.latest().map(|n| n.message.as_str()), Some("new"));
        assert_eq!(board.active(start + Duration::seconds(10)).count(), 1);
    }
}
