//! Entry → notification rendering: bounded HTML body plus the action row.

use crate::{
    callback::{CallbackAction, CallbackData},
    domain::Entry,
    errors::Error,
    messaging::types::{InlineButton, InlineKeyboard, OutboundMessage},
    Result,
};

/// Telegram hard cap on message text length, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Per-push rendering options, taken from the integration settings.
/// The default is title-only notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatOptions {
    pub include_body: bool,
    pub preview_length: usize,
}

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Hard cut at `limit` characters. No word or tag boundary awareness.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render one entry into a notification message with its action row.
///
/// The assembled text is capped at [`MESSAGE_LIMIT`] from the end; when the
/// cap bites, the footer may be cut mid-line. That is the documented
/// tradeoff, not something to repair here.
pub fn format_entry(entry: &Entry, options: &FormatOptions) -> Result<OutboundMessage> {
    if entry.title.trim().is_empty() {
        return Err(Error::Formatting("entry has no title".to_string()));
    }
    if entry.url.trim().is_empty() {
        return Err(Error::Formatting("entry has no URL".to_string()));
    }

    let mut text = format!("<b>{}</b>", escape_html(&entry.title));

    if options.include_body && options.preview_length > 0 {
        let preview = truncate_chars(&entry.content, options.preview_length);
        if !preview.is_empty() {
            text.push_str("\n\n");
            text.push_str(&escape_html(preview));
        }
    }

    text.push_str("\n\n");
    text.push_str(&footer_line(entry));

    if text.chars().count() > MESSAGE_LIMIT {
        text = truncate_chars(&text, MESSAGE_LIMIT).to_string();
    }

    let mark = CallbackData::new(CallbackAction::Read, &entry.hash);
    Ok(OutboundMessage {
        keyboard: entry_action_row(&entry.url, &entry.comments_url, &mark),
        text,
    })
}

fn footer_line(entry: &Entry) -> String {
    let date = entry.published_at.format("%Y-%m-%d %H:%M");
    if entry.author.trim().is_empty() {
        format!("<i>{date}</i>")
    } else {
        format!("<i>{date} · {}</i>", escape_html(&entry.author))
    }
}

/// Action row shared by pushes and keyboard re-renders: an `Open` link, the
/// mark-as-read/unread control encoding `mark`, and a `Comments` link when
/// the entry has one.
pub fn entry_action_row(url: &str, comments_url: &str, mark: &CallbackData) -> InlineKeyboard {
    let label = match mark.action {
        CallbackAction::Read => "Mark as read",
        CallbackAction::Unread => "Mark as unread",
        // Entry rows only ever carry a toggle control.
        CallbackAction::ReadAll | CallbackAction::Cancel => "Mark as read",
    };

    let mut row = vec![
        InlineButton::url("Open", url),
        InlineButton::callback(label, mark.encode()),
    ];
    if !comments_url.is_empty() {
        row.push(InlineButton::url("Comments", comments_url));
    }
    InlineKeyboard::single_row(row)
}
