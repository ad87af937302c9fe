//! Telegram adapter (teloxide).
//!
//! Implements the `feedgram-core` ChatPort over the Telegram Bot API and
//! owns the session lifecycle: one authenticated bot per configured chat,
//! one long-poll loop per session.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    RequestError,
};

use tokio::time::sleep;
use tracing::warn;

pub mod poll;
pub mod registry;
pub mod service;
pub mod session;

use feedgram_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::ChatPort,
        types::{ButtonKind, InlineKeyboard},
    },
    Result,
};

/// ChatPort implementation over one teloxide `Bot`.
///
/// Every call makes exactly one Telegram request, plus one fixed-delay retry
/// if and only if the first attempt was rate-limited. The second failure is
/// final; nothing queues.
#[derive(Clone)]
pub struct TelegramChat {
    bot: Bot,
    retry_delay: Duration,
}

impl TelegramChat {
    pub fn new(bot: Bot, retry_delay: Duration) -> Self {
        Self { bot, retry_delay }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }

    fn markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|b| match b.kind {
                        ButtonKind::Callback(data) => {
                            Some(InlineKeyboardButton::callback(b.label, data))
                        }
                        ButtonKind::Url(url) => match url.parse() {
                            Ok(parsed) => Some(InlineKeyboardButton::url(b.label, parsed)),
                            Err(_) => {
                                warn!("dropping button {:?}: unparseable url {url:?}", b.label);
                                None
                            }
                        },
                    })
                    .collect()
            })
            .collect();
        InlineKeyboardMarkup::new(rows)
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    RequestError::RetryAfter(_) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        warn!(
                            "rate limited, retrying once in {:?}",
                            self.retry_delay
                        );
                        sleep(self.retry_delay).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl ChatPort for TelegramChat {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let markup = keyboard.map(Self::markup);
        let msg = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), text.to_string())
                    .parse_mode(ParseMode::Html);
                if let Some(markup) = markup.clone() {
                    req = req.reply_markup(markup);
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_text(&self, msg: MessageRef, text: &str, keyboard: InlineKeyboard) -> Result<()> {
        let markup = Self::markup(keyboard);
        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    text.to_string(),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn edit_keyboard(&self, msg: MessageRef, keyboard: InlineKeyboard) -> Result<()> {
        let markup = Self::markup(keyboard);
        self.with_retry(|| {
            self.bot
                .edit_message_reply_markup(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                )
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.with_retry(|| self.bot.answer_callback_query(callback_id.to_string()))
            .await?;
        Ok(())
    }
}
