use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use feedgram_core::domain::ChatId;

use crate::session::BotSession;

struct ActiveSession {
    session: Arc<BotSession>,
    cancel: CancellationToken,
}

/// Process-wide table of live bot sessions, keyed by chat id.
///
/// At most one session per chat. The lock guards only the map itself; no
/// network call ever happens while it is held.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<i64, ActiveSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session and hand back the cancellation token its polling
    /// loop must watch. A session already registered for the chat is
    /// superseded: its loop is signalled to stop before the new handle goes
    /// in, so two loops never poll the same chat. In-flight sends on the old
    /// bot may still complete.
    pub async fn install(&self, session: Arc<BotSession>) -> CancellationToken {
        let chat_id = session.chat_id();
        let cancel = CancellationToken::new();

        let mut map = self.inner.lock().await;
        if let Some(old) = map.remove(&chat_id.0) {
            info!("replacing session for chat {chat_id}");
            old.cancel.cancel();
        }
        map.insert(
            chat_id.0,
            ActiveSession {
                session,
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    pub async fn lookup(&self, chat_id: ChatId) -> Option<Arc<BotSession>> {
        self.inner
            .lock()
            .await
            .get(&chat_id.0)
            .map(|active| active.session.clone())
    }

    /// Tear a session down, stopping its loop.
    pub async fn remove(&self, chat_id: ChatId) -> bool {
        match self.inner.lock().await.remove(&chat_id.0) {
            Some(old) => {
                old.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
