use std::path::Path;

use crate::domain::ChatId;

/// Core error type for the relay.
///
/// Adapter crates map their specific errors into this type. Registry and
/// lookup failures abort an invocation; transport failures on a forward are
/// collected per recipient instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("transport error for chat {chat_id}: {reason}")]
    Transport { chat_id: ChatId, reason: String },

    #[error("chat {0} is not in the roster")]
    NotFound(ChatId),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn registry_at(path: &Path, what: &str, e: impl std::fmt::Display) -> Self {
        Error::Registry(format!("{what} {}: {e}", path.display()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
