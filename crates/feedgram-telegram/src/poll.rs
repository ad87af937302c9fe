//! Per-session long-poll loop and wire-to-core update conversion.

use std::{sync::Arc, time::Duration};

use teloxide::{
    prelude::*,
    types::{AllowedUpdate, Update, UpdateKind},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use feedgram_core::{
    dispatch::Dispatcher,
    domain::{ChatId, MessageId, MessageRef, SenderId},
    messaging::types::{CallbackQuery, Command, IncomingUpdate},
};

use crate::session::BotSession;

/// Pause after a failed `getUpdates` before re-issuing, so a broken network
/// does not spin the loop.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Long-poll loop for one session. Runs until the process exits or the
/// registry cancels the token when the session is replaced or removed.
///
/// Updates are processed strictly in delivery order, one at a time; ordering
/// across sessions is not coordinated.
pub async fn run_polling(
    session: Arc<BotSession>,
    dispatcher: Dispatcher,
    poll_timeout: Duration,
    cancel: CancellationToken,
) {
    let bot = session.chat().bot();
    let chat_id = session.chat_id();
    let mut offset: i32 = 0;

    info!("polling started for chat {chat_id}");
    loop {
        let mut request = bot
            .get_updates()
            .timeout(poll_timeout.as_secs() as u32)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery]);
        if offset != 0 {
            request = request.offset(offset);
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("polling stopped for chat {chat_id}");
                return;
            }
            batch = async { request.await } => match batch {
                Ok(updates) => {
                    for update in updates {
                        offset = update.id + 1;
                        if let Some(incoming) = convert_update(update) {
                            dispatcher.handle_update(incoming).await;
                        }
                    }
                }
                Err(err) => {
                    warn!("long poll failed for chat {chat_id}: {err}");
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                    }
                }
            }
        }
    }
}

/// Normalize a Telegram update into the core model. Updates the bridge does
/// not react to collapse to `None`.
pub fn convert_update(update: Update) -> Option<IncomingUpdate> {
    match update.kind {
        UpdateKind::Message(msg) => {
            let text = msg.text()?;
            let sender = msg
                .from()
                .map(|u| SenderId(u.id.0 as i64))
                .unwrap_or(SenderId(msg.chat.id.0));
            let name = parse_command(text);
            Some(IncomingUpdate::Command(Command {
                chat_id: ChatId(msg.chat.id.0),
                sender,
                name,
            }))
        }
        UpdateKind::CallbackQuery(query) => {
            let data = query.data?;
            let message = query.message.as_ref().map(|m| MessageRef {
                chat_id: ChatId(m.chat.id.0),
                message_id: MessageId(m.id.0),
            });
            // Without the originating message there is no chat to authorize
            // against, so the press is dropped here.
            let chat_id = message.map(|m| m.chat_id)?;
            Some(IncomingUpdate::Callback(CallbackQuery {
                chat_id,
                sender: SenderId(query.from.id.0 as i64),
                callback_id: query.id,
                data,
                message,
            }))
        }
        other => {
            debug!("ignoring update kind {other:?}");
            None
        }
    }
}

/// Extract a lowercase command name from `/cmd@botname ...`. Plain text
/// yields an empty name, which routes to the help reply; trailing words are
/// dropped since no supported command takes arguments.
pub fn parse_command(text: &str) -> String {
    let first = text.trim().split_whitespace().next().unwrap_or("");

    if !first.starts_with('/') {
        return String::new();
    }

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing_handles_bot_suffix_and_case() {
        assert_eq!(parse_command("/read_all"), "read_all");
        assert_eq!(parse_command("/Read_All@feedbot now"), "read_all");
        assert_eq!(parse_command("hello there"), "");
        assert_eq!(parse_command(""), "");
    }

    fn message_json(chat_id: i64, text: &str) -> serde_json::Value {
        serde_json::json!({
            "message_id": 10,
            "date": 1700000000,
            "chat": { "id": chat_id, "type": "private", "first_name": "A" },
            "from": { "id": 500, "is_bot": false, "first_name": "A" },
            "text": text,
        })
    }

    // `Update` must be deserialized from a string: teloxide's custom
    // deserializer falls back to `UpdateKind::Error` when driven by
    // `serde_json::from_value`.
    fn update_from_json(value: serde_json::Value) -> Update {
        serde_json::from_str(&value.to_string()).unwrap()
    }

    #[test]
    fn message_update_becomes_command() {
        let update = update_from_json(serde_json::json!({
            "update_id": 1,
            "message": message_json(100, "/read_all"),
        }));

        match convert_update(update) {
            Some(IncomingUpdate::Command(cmd)) => {
                assert_eq!(cmd.chat_id, ChatId(100));
                assert_eq!(cmd.sender, SenderId(500));
                assert_eq!(cmd.name, "read_all");
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_message_becomes_nameless_command() {
        let update = update_from_json(serde_json::json!({
            "update_id": 4,
            "message": message_json(100, "hello there"),
        }));

        match convert_update(update) {
            Some(IncomingUpdate::Command(cmd)) => assert!(cmd.name.is_empty()),
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn callback_update_carries_payload_and_message_ref() {
        let update = update_from_json(serde_json::json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb1",
                "from": { "id": 500, "is_bot": false, "first_name": "A" },
                "chat_instance": "ci",
                "data": "read/abc123",
                "message": message_json(100, "notification"),
            },
        }));

        match convert_update(update) {
            Some(IncomingUpdate::Callback(query)) => {
                assert_eq!(query.chat_id, ChatId(100));
                assert_eq!(query.data, "read/abc123");
                assert_eq!(
                    query.message,
                    Some(MessageRef {
                        chat_id: ChatId(100),
                        message_id: MessageId(10),
                    })
                );
            }
            other => panic!("expected callback, got {other:?}"),
        }
    }

    #[test]
    fn callback_without_message_is_dropped() {
        let update = update_from_json(serde_json::json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb1",
                "from": { "id": 500, "is_bot": false, "first_name": "A" },
                "chat_instance": "ci",
                "data": "read/abc123",
            },
        }));

        assert!(convert_update(update).is_none());
    }
}
