use async_trait::async_trait;

use crate::{
    domain::{Credential, EntryRef, EntryStatus, SenderId, UserId, UserRef},
    Result,
};

/// Port over the feed reader's storage layer.
///
/// Lookup misses are `Ok(None)`, distinct from transport errors; the
/// dispatcher logs and drops on a miss but treats `Err` the same way, so
/// nothing in this trait can take a session loop down.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Resolve the account that owns the integration for a Telegram sender.
    async fn user_by_chat_id(&self, sender: SenderId) -> Result<Option<UserRef>>;

    /// Resolve an entry by its stable external hash.
    async fn entry_by_hash(&self, hash: &str) -> Result<Option<EntryRef>>;

    /// Set the read-state of the given entries for one account. Repeating a
    /// status already in place is a no-op, not an error.
    async fn set_entries_status(
        &self,
        user_id: UserId,
        entry_ids: &[i64],
        status: EntryStatus,
    ) -> Result<()>;

    /// Mark every unread entry of one account as read.
    async fn mark_all_as_read(&self, user_id: UserId) -> Result<()>;

    /// All Telegram integrations currently configured, consumed once at
    /// startup to bootstrap the session registry.
    async fn configured_integrations(&self) -> Result<Vec<Credential>>;
}
