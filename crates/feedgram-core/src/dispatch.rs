//! Per-session update handling: authorization, commands, and callback-driven
//! state transitions.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    callback::{plan, CallbackData, CallbackReply, Mutation},
    domain::{ChatId, EntryRef, UserRef},
    errors::Error,
    messaging::{
        port::ChatPort,
        types::{CallbackQuery, Command, IncomingUpdate, InlineButton, InlineKeyboard},
    },
    storage::Storage,
    Result,
};

const HELP_TEXT: &str = "Available commands: /read_all";
const READ_ALL_PROMPT: &str = "Are you sure?";

/// Routes one session's updates. Owned by that session's long-poll loop;
/// holds no mutable state of its own, so a replaced session can simply drop
/// its dispatcher.
pub struct Dispatcher {
    chat_id: ChatId,
    storage: Arc<dyn Storage>,
    chat: Arc<dyn ChatPort>,
}

impl Dispatcher {
    pub fn new(chat_id: ChatId, storage: Arc<dyn Storage>, chat: Arc<dyn ChatPort>) -> Self {
        Self {
            chat_id,
            storage,
            chat,
        }
    }

    /// Handle one update. Never returns an error: every failure mode here is
    /// logged and dropped so the polling loop outlives bad input.
    pub async fn handle_update(&self, update: IncomingUpdate) {
        if let Err(err) = self.dispatch(update).await {
            match err {
                Error::Unauthorized { .. } => warn!("{err}"),
                Error::UnknownAction(_) | Error::Lookup(_) => warn!("update dropped: {err}"),
                other => error!("update handling failed: {other}"),
            }
        }
    }

    async fn dispatch(&self, update: IncomingUpdate) -> Result<()> {
        // Authorization first: an update from any other chat is discarded
        // without a reply, so probing cannot tell a wrong chat id apart from
        // a dead bot.
        if update.chat_id() != self.chat_id {
            return Err(Error::Unauthorized {
                expected: self.chat_id,
                got: update.chat_id(),
            });
        }

        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Callback(query) => self.handle_callback(query).await,
        }
    }

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        match cmd.name.as_str() {
            // Destructive, so never one-shot: reply with a confirmation
            // prompt and mutate only when the confirm button comes back.
            "read_all" => {
                let keyboard = InlineKeyboard::single_row(vec![
                    InlineButton::callback("Yes!", "read_all/"),
                    InlineButton::callback("No.", "cancel/"),
                ]);
                self.chat
                    .send(self.chat_id, READ_ALL_PROMPT, Some(keyboard))
                    .await?;
            }
            other => {
                debug!("unknown command {other:?}, replying with help");
                self.chat.send(self.chat_id, HELP_TEXT, None).await?;
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        // Acknowledge right away so the client stops spinning, whatever
        // happens to the payload afterwards.
        if let Err(err) = self.chat.answer_callback(&query.callback_id).await {
            debug!("answering callback query failed: {err}");
        }

        let data = CallbackData::parse(&query.data)?;
        let user = self.resolve_user(&query).await?;
        let entry = self.resolve_entry(&data).await?;

        let outcome = plan(&data, entry.as_ref(), &user)?;

        // Mutation failures leave the prior message untouched rather than
        // flipping a control that no longer tells the truth.
        if let Some(mutation) = outcome.mutation {
            self.apply_mutation(mutation).await?;
        }

        let Some(message) = query.message else {
            debug!("callback without an originating message, skipping edit");
            return Ok(());
        };

        match outcome.reply {
            CallbackReply::EditKeyboard(keyboard) => {
                self.chat.edit_keyboard(message, keyboard).await?;
            }
            CallbackReply::EditText(text) => {
                self.chat
                    .edit_text(message, &text, InlineKeyboard::empty())
                    .await?;
            }
        }
        Ok(())
    }

    async fn resolve_user(&self, query: &CallbackQuery) -> Result<UserRef> {
        self.storage
            .user_by_chat_id(query.sender)
            .await?
            .ok_or_else(|| Error::Lookup(format!("no user mapped to sender {:?}", query.sender)))
    }

    /// Entry resolution is skipped for chat-scoped payloads (empty hash).
    async fn resolve_entry(&self, data: &CallbackData) -> Result<Option<EntryRef>> {
        if data.entry_hash.is_empty() {
            return Ok(None);
        }
        let entry = self
            .storage
            .entry_by_hash(&data.entry_hash)
            .await?
            .ok_or_else(|| Error::Lookup(format!("no entry with hash {:?}", data.entry_hash)))?;
        Ok(Some(entry))
    }

    async fn apply_mutation(&self, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::SetStatus {
                user_id,
                entry_ids,
                status,
            } => {
                self.storage
                    .set_entries_status(user_id, &entry_ids, status)
                    .await
            }
            Mutation::MarkAllRead { user_id } => self.storage.mark_all_as_read(user_id).await,
        }
    }
}
