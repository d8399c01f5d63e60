//! Transient success / error banners.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default time a banner stays on screen.
pub const DEFAULT_BANNER_TTL_MS: i64 = 4_000;

/// The only two outcomes the UI distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissible, auto-expiring banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Banner queue owned by a screen.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    notices: Vec<Notice>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(Duration::milliseconds(DEFAULT_BANNER_TTL_MS))
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Vec::new(),
        }
    }

    pub fn success(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Uuid {
        self.push(NoticeKind::Success, message.into(), now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Uuid {
        self.push(NoticeKind::Error, message.into(), now)
    }

    fn push(&mut self, kind: NoticeKind, message: String, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        tracing::debug!(?kind, %message, "Banner shown");
        self.notices.push(Notice {
            id,
            kind,
            message,
            created_at: now,
            expires_at: now + self.ttl,
        });
        id
    }

    /// Close a banner. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop expired banners. Returns how many were removed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.notices.len();
        self.notices.retain(|n| !n.is_expired(now));
        before - self.notices.len()
    }

    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notice> + '_ {
        self.notices.iter().filter(move |n| !n.is_expired(now))
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_banners_expire_after_ttl() {
        let mut notices = Notifications::with_ttl(Duration::milliseconds(1_000));
        notices.success("Saved", at(0));
        notices.error("Failed", at(500));

        assert_eq!(notices.active(at(999)).count(), 2);
        assert_eq!(notices.expire(at(1_000)), 1);
        assert_eq!(notices.latest().unwrap().kind, NoticeKind::Error);
        assert_eq!(notices.expire(at(1_500)), 1);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut notices = Notifications::new();
        let id = notices.error("Failed", at(0));
        assert!(notices.dismiss(id));
        assert!(!notices.dismiss(id));
    }
}
