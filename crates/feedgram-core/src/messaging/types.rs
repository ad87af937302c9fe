use crate::domain::{ChatId, MessageRef, SenderId};

/// Incoming update model, normalized from the Telegram wire types by the
/// adapter before dispatch. Only the two shapes the bridge reacts to exist;
/// everything else is dropped at the adapter boundary.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    /// Chat the update originated from, used for the authorization check.
    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.chat_id,
            IncomingUpdate::Callback(q) => q.chat_id,
        }
    }
}

/// A user-issued command (`/read_all`) or any other plain text message.
/// Non-command text carries an empty `name` and gets the help reply.
/// No supported command takes arguments, so only the name survives parsing.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub sender: SenderId,
    pub name: String,
}

/// An inline-button press on a previously sent notification.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub sender: SenderId,
    pub callback_id: String,
    pub data: String,
    /// The message the pressed keyboard is attached to. Absent for presses on
    /// messages Telegram no longer retains; those cannot be edited back.
    pub message: Option<MessageRef>,
}

/// One inline control in an action row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub kind: ButtonKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonKind {
    /// Opens a link; never produces a callback.
    Url(String),
    /// Sends the encoded payload back as a callback query.
    Callback(String),
}

impl InlineButton {
    pub fn url(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Url(target.into()),
        }
    }

    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Callback(data.into()),
        }
    }
}

/// Inline keyboard attached to an outbound message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    /// Editing a message with this markup clears its keyboard.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }
}

/// A fully assembled notification: HTML text plus its action row.
/// Constructed fresh per push, never persisted.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: InlineKeyboard,
}
