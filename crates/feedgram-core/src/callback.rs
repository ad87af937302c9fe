//! Callback payload codec and the state-transition table behind inline
//! button presses.

use crate::{
    domain::{EntryRef, EntryStatus, UserId, UserRef},
    errors::Error,
    format::entry_action_row,
    messaging::types::InlineKeyboard,
    Result,
};

/// Telegram hard cap on inline-button callback data, in bytes.
pub const CALLBACK_DATA_LIMIT: usize = 64;

/// Everything an inline control is allowed to ask for. Decoded exactly once
/// at the dispatcher boundary; unrecognized words are an error, not a silent
/// fall-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Read,
    Unread,
    ReadAll,
    Cancel,
}

impl CallbackAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CallbackAction::Read => "read",
            CallbackAction::Unread => "unread",
            CallbackAction::ReadAll => "read_all",
            CallbackAction::Cancel => "cancel",
        }
    }
}

impl std::str::FromStr for CallbackAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(CallbackAction::Read),
            "unread" => Ok(CallbackAction::Unread),
            "read_all" => Ok(CallbackAction::ReadAll),
            "cancel" => Ok(CallbackAction::Cancel),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// Decoded callback payload: `"<action>/<entryHash>"` on the wire, with an
/// empty hash for chat-scoped actions (`read_all/`, `cancel/`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackData {
    pub action: CallbackAction,
    pub entry_hash: String,
}

impl CallbackData {
    pub fn new(action: CallbackAction, entry_hash: impl Into<String>) -> Self {
        Self {
            action,
            entry_hash: entry_hash.into(),
        }
    }

    /// Wire encoding, hard-truncated to [`CALLBACK_DATA_LIMIT`] bytes.
    ///
    /// Known limitation: hashes long enough to overflow the limit are cut,
    /// and two distinct entries sharing a long prefix could collide.
    pub fn encode(&self) -> String {
        let mut encoded = format!("{}/{}", self.action.as_str(), self.entry_hash);
        if encoded.len() > CALLBACK_DATA_LIMIT {
            let mut end = CALLBACK_DATA_LIMIT;
            while !encoded.is_char_boundary(end) {
                end -= 1;
            }
            encoded.truncate(end);
        }
        encoded
    }

    pub fn parse(data: &str) -> Result<Self> {
        let (action, entry_hash) = data
            .split_once('/')
            .ok_or_else(|| Error::UnknownAction(data.to_string()))?;
        Ok(Self {
            action: action.parse()?,
            entry_hash: entry_hash.to_string(),
        })
    }
}

/// Storage mutation a callback asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    SetStatus {
        user_id: UserId,
        entry_ids: Vec<i64>,
        status: EntryStatus,
    },
    MarkAllRead {
        user_id: UserId,
    },
}

/// How the originating message is edited once the mutation succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackReply {
    /// Keep the text, swap the keyboard (read/unread toggle).
    EditKeyboard(InlineKeyboard),
    /// Replace the text and clear the keyboard (terminal actions).
    EditText(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPlan {
    pub mutation: Option<Mutation>,
    pub reply: CallbackReply,
}

/// Pure mapping from a decoded callback to its storage mutation and message
/// edit. Toggle replies re-encode the opposite action so the displayed
/// control always names the transition that will run next.
pub fn plan(data: &CallbackData, entry: Option<&EntryRef>, user: &UserRef) -> Result<CallbackPlan> {
    match data.action {
        CallbackAction::Read | CallbackAction::Unread => {
            let entry = entry.ok_or_else(|| {
                Error::Lookup(format!("no entry resolved for hash {:?}", data.entry_hash))
            })?;
            let (status, next) = match data.action {
                CallbackAction::Read => (EntryStatus::Read, CallbackAction::Unread),
                _ => (EntryStatus::Unread, CallbackAction::Read),
            };
            let mark = CallbackData::new(next, entry.hash.clone());

            Ok(CallbackPlan {
                mutation: Some(Mutation::SetStatus {
                    user_id: user.id,
                    entry_ids: vec![entry.id],
                    status,
                }),
                reply: CallbackReply::EditKeyboard(entry_action_row(
                    &entry.url,
                    &entry.comments_url,
                    &mark,
                )),
            })
        }
        CallbackAction::ReadAll => Ok(CallbackPlan {
            mutation: Some(Mutation::MarkAllRead { user_id: user.id }),
            reply: CallbackReply::EditText("Successfully marked everything as read!".to_string()),
        }),
        CallbackAction::Cancel => Ok(CallbackPlan {
            mutation: None,
            reply: CallbackReply::EditText("Action canceled.".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::ButtonKind;

    fn entry_ref() -> EntryRef {
        EntryRef {
            id: 7,
            hash: "abc123".to_string(),
            url: "https://x".to_string(),
            comments_url: String::new(),
        }
    }

    fn user() -> UserRef {
        UserRef { id: UserId(3) }
    }

    #[test]
    fn parse_round_trips() {
        let data = CallbackData::parse("read/abc123").unwrap();
        assert_eq!(data.action, CallbackAction::Read);
        assert_eq!(data.entry_hash, "abc123");
        assert_eq!(data.encode(), "read/abc123");
    }

    #[test]
    fn chat_scoped_actions_have_empty_hash() {
        let data = CallbackData::parse("read_all/").unwrap();
        assert_eq!(data.action, CallbackAction::ReadAll);
        assert!(data.entry_hash.is_empty());
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            CallbackData::parse("nuke/abc"),
            Err(Error::UnknownAction(_))
        ));
        assert!(matches!(
            CallbackData::parse("no-slash"),
            Err(Error::UnknownAction(_))
        ));
    }

    #[test]
    fn encoding_truncates_to_sixty_four_bytes() {
        let long_hash = "h".repeat(100);
        let data = CallbackData::new(CallbackAction::Unread, long_hash.clone());
        let encoded = data.encode();
        assert_eq!(encoded.len(), CALLBACK_DATA_LIMIT);
        let full = format!("unread/{long_hash}");
        assert_eq!(encoded, &full[..CALLBACK_DATA_LIMIT]);
    }

    #[test]
    fn toggle_is_an_involution() {
        let original = CallbackData::new(CallbackAction::Read, "abc123");
        let entry = entry_ref();

        // Press "Mark as read": the control must now encode unread/<hash>.
        let after_read = plan(&original, Some(&entry), &user()).unwrap();
        let toggled = match &after_read.reply {
            CallbackReply::EditKeyboard(kb) => match &kb.rows[0][1].kind {
                ButtonKind::Callback(data) => CallbackData::parse(data).unwrap(),
                other => panic!("expected callback control, got {other:?}"),
            },
            other => panic!("expected keyboard edit, got {other:?}"),
        };
        assert_eq!(toggled, CallbackData::new(CallbackAction::Unread, "abc123"));

        // Press it again: back to the original payload.
        let after_unread = plan(&toggled, Some(&entry), &user()).unwrap();
        match &after_unread.reply {
            CallbackReply::EditKeyboard(kb) => match &kb.rows[0][1].kind {
                ButtonKind::Callback(data) => assert_eq!(data, &original.encode()),
                other => panic!("expected callback control, got {other:?}"),
            },
            other => panic!("expected keyboard edit, got {other:?}"),
        }
    }

    #[test]
    fn read_marks_entry_for_resolving_user() {
        let outcome = plan(
            &CallbackData::new(CallbackAction::Read, "abc123"),
            Some(&entry_ref()),
            &user(),
        )
        .unwrap();

        assert_eq!(
            outcome.mutation,
            Some(Mutation::SetStatus {
                user_id: UserId(3),
                entry_ids: vec![7],
                status: EntryStatus::Read,
            })
        );
    }

    #[test]
    fn toggle_without_entry_is_a_lookup_error() {
        let outcome = plan(&CallbackData::new(CallbackAction::Read, "gone"), None, &user());
        assert!(matches!(outcome, Err(Error::Lookup(_))));
    }

    #[test]
    fn read_all_mutates_and_clears_keyboard() {
        let outcome = plan(
            &CallbackData::new(CallbackAction::ReadAll, ""),
            None,
            &user(),
        )
        .unwrap();

        assert_eq!(
            outcome.mutation,
            Some(Mutation::MarkAllRead { user_id: UserId(3) })
        );
        assert_eq!(
            outcome.reply,
            CallbackReply::EditText("Successfully marked everything as read!".to_string())
        );
    }

    #[test]
    fn cancel_never_mutates() {
        let outcome = plan(
            &CallbackData::new(CallbackAction::Cancel, ""),
            None,
            &user(),
        )
        .unwrap();

        assert_eq!(outcome.mutation, None);
        assert_eq!(
            outcome.reply,
            CallbackReply::EditText("Action canceled.".to_string())
        );
    }
}
