use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::InlineKeyboard,
    Result,
};

/// Port over the remote messaging service, implemented by the Telegram
/// adapter. Every method performs at most two network calls: one attempt plus
/// one fixed-delay retry if and only if the first attempt was rate-limited.
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send HTML text with an optional inline keyboard.
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef>;

    /// Replace a message's text and keyboard in one edit.
    async fn edit_text(&self, msg: MessageRef, text: &str, keyboard: InlineKeyboard) -> Result<()>;

    /// Replace only a message's keyboard.
    async fn edit_keyboard(&self, msg: MessageRef, keyboard: InlineKeyboard) -> Result<()>;

    /// Acknowledge a callback query so the client stops showing a spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}
