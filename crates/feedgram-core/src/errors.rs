use crate::domain::ChatId;

/// Core error type for the bridge.
///
/// The Telegram adapter maps its transport errors into this type so the
/// dispatch loop can handle failures consistently (terminal configuration
/// failure vs logged-and-dropped delivery failure).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("unauthorized update from chat {got}, session is bound to {expected}")]
    Unauthorized { expected: ChatId, got: ChatId },

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("message formatting failed: {0}")]
    Formatting(String),

    #[error("unknown callback action: {0:?}")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
