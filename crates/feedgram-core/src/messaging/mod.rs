//! Messenger abstractions: outbound messages, inline keyboards, incoming
//! updates, and the port the Telegram adapter implements.

pub mod port;
pub mod types;
