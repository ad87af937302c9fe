use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use tracing::info;

use feedgram_core::{
    domain::{ChatId, Credential},
    errors::Error,
    Result,
};

use crate::TelegramChat;

/// One authenticated bot bound to the single chat its credential authorizes.
///
/// Owned by the registry; replaced (never mutated) when the integration is
/// reconfigured.
pub struct BotSession {
    chat_id: ChatId,
    chat: Arc<TelegramChat>,
    created_at: DateTime<Utc>,
}

impl BotSession {
    /// Authenticate the credential against Telegram and build the session.
    ///
    /// A rejected token is terminal for the integration: the caller surfaces
    /// the error to whoever configured it, nothing is installed.
    pub async fn connect(credential: &Credential, retry_delay: Duration) -> Result<Self> {
        let bot = Bot::new(credential.bot_token.clone());
        let me = bot
            .get_me()
            .await
            .map_err(|e| Error::Auth(format!("bot token rejected: {e}")))?;

        info!(
            "bot @{} authenticated for chat {}",
            me.username(),
            credential.chat_id
        );
        Ok(Self::with_bot(bot, credential.chat_id, retry_delay))
    }

    pub(crate) fn with_bot(bot: Bot, chat_id: ChatId, retry_delay: Duration) -> Self {
        Self {
            chat_id,
            chat: Arc::new(TelegramChat::new(bot, retry_delay)),
            created_at: Utc::now(),
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn chat(&self) -> Arc<TelegramChat> {
        self.chat.clone()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
