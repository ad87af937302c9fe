//! The surface the host application talks to: bootstrap at startup,
//! `register` when the configuration UI saves an integration, `push` when the
//! feed-fetch pipeline has a new entry to deliver.

use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info};

use feedgram_core::{
    config::Config,
    dispatch::Dispatcher,
    domain::{Credential, Entry, MessageRef},
    format::{format_entry, FormatOptions},
    messaging::port::ChatPort,
    storage::Storage,
    Result,
};

use crate::{poll::run_polling, registry::SessionRegistry, session::BotSession, TelegramChat};

pub struct Service {
    config: Config,
    storage: Arc<dyn Storage>,
    registry: Arc<SessionRegistry>,
}

impl Service {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            storage,
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    /// Start a session for every configured integration.
    ///
    /// A failing integration is logged and skipped; the others still come up.
    /// Only the storage read itself can fail this call.
    pub async fn bootstrap(&self) -> Result<()> {
        let credentials = self.storage.configured_integrations().await?;
        info!("bootstrapping {} telegram integration(s)", credentials.len());

        for credential in credentials {
            if let Err(err) = self.register(credential.clone()).await {
                error!(
                    "integration for chat {} failed to start: {err}",
                    credential.chat_id
                );
            }
        }
        Ok(())
    }

    /// Authenticate a credential, install its session, and start its polling
    /// loop. Replaces (and stops) any previous session for the same chat.
    ///
    /// An invalid token surfaces as `Error::Auth` and installs nothing.
    pub async fn register(&self, credential: Credential) -> Result<Arc<BotSession>> {
        let session = Arc::new(
            BotSession::connect(&credential, self.config.rate_limit_retry_delay).await?,
        );

        let cancel = self.registry.install(session.clone()).await;
        let dispatcher = Dispatcher::new(session.chat_id(), self.storage.clone(), session.chat());
        tokio::spawn(run_polling(
            session.clone(),
            dispatcher,
            self.config.poll_timeout,
            cancel,
        ));

        Ok(session)
    }

    /// Deliver one entry notification outside the long-poll loop.
    ///
    /// Formatting failures surface to the caller before anything is sent.
    /// Uses the registered session when one exists; otherwise a one-shot
    /// connection, so pushes work even when polling was never set up.
    pub async fn push(
        &self,
        entry: &Entry,
        credential: &Credential,
        options: &FormatOptions,
    ) -> Result<MessageRef> {
        let message = format_entry(entry, options)?;

        let chat: Arc<dyn ChatPort> = match self.registry.lookup(credential.chat_id).await {
            Some(session) => session.chat(),
            None => Arc::new(TelegramChat::new(
                Bot::new(credential.bot_token.clone()),
                self.config.rate_limit_retry_delay,
            )),
        };

        chat.send(credential.chat_id, &message.text, Some(message.keyboard))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use feedgram_core::{
        domain::{ChatId, EntryRef, EntryStatus, SenderId, UserId, UserRef},
        errors::Error,
    };

    struct EmptyStorage;

    #[async_trait]
    impl Storage for EmptyStorage {
        async fn user_by_chat_id(&self, _sender: SenderId) -> Result<Option<UserRef>> {
            Ok(None)
        }
        async fn entry_by_hash(&self, _hash: &str) -> Result<Option<EntryRef>> {
            Ok(None)
        }
        async fn set_entries_status(
            &self,
            _user_id: UserId,
            _entry_ids: &[i64],
            _status: EntryStatus,
        ) -> Result<()> {
            Ok(())
        }
        async fn mark_all_as_read(&self, _user_id: UserId) -> Result<()> {
            Ok(())
        }
        async fn configured_integrations(&self) -> Result<Vec<Credential>> {
            Ok(Vec::new())
        }
    }

    fn service() -> Service {
        Service::new(Config::default(), Arc::new(EmptyStorage))
    }

    #[tokio::test]
    async fn bootstrap_with_no_integrations_is_a_noop() {
        let svc = service();
        svc.bootstrap().await.unwrap();
        assert!(svc.registry().is_empty().await);
    }

    #[tokio::test]
    async fn push_aborts_on_formatting_error_before_any_send() {
        let svc = service();
        let entry = Entry {
            id: 1,
            hash: "abc".to_string(),
            title: String::new(),
            content: "body".to_string(),
            url: "https://x".to_string(),
            comments_url: String::new(),
            author: String::new(),
            published_at: Utc::now(),
        };
        let credential = Credential {
            bot_token: "123456:TEST".to_string(),
            chat_id: ChatId(1),
        };

        let out = svc
            .push(&entry, &credential, &FormatOptions::default())
            .await;
        assert!(matches!(out, Err(Error::Formatting(_))));
    }
}
