use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Telegram identity of whoever produced an update (numeric user id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SenderId(pub i64);

/// Feed-reader account id (storage primary key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// One configured Telegram integration: a bot token bound to the single chat
/// it is allowed to talk to. Immutable once a session is created from it;
/// reconfiguration replaces the credential, never mutates it.
#[derive(Clone, Deserialize)]
pub struct Credential {
    pub bot_token: String,
    pub chat_id: ChatId,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("bot_token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Full entry projection handed to the bridge by the feed-fetch pipeline when
/// pushing a notification.
#[derive(Clone, Debug)]
pub struct Entry {
    pub id: i64,
    pub hash: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub comments_url: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
}

/// Read-only entry slice resolved from storage by hash while handling a
/// callback. Never cached beyond a single dispatch cycle.
#[derive(Clone, Debug)]
pub struct EntryRef {
    pub id: i64,
    pub hash: String,
    pub url: String,
    pub comments_url: String,
}

/// Read-only user slice resolved from the callback sender identity.
#[derive(Clone, Copy, Debug)]
pub struct UserRef {
    pub id: UserId,
}

/// Entry read-state as stored by the feed reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    Read,
    Unread,
}

impl EntryStatus {
    /// Wire word used by the storage layer.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Read => "read",
            EntryStatus::Unread => "unread",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_redacts_token() {
        let cred = Credential {
            bot_token: "123456:secret".to_string(),
            chat_id: ChatId(42),
        };
        let out = format!("{cred:?}");
        assert!(!out.contains("secret"));
        assert!(out.contains("42"));
    }
}
