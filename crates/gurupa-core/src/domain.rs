use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram chat id (numeric). Identifies one subscriber.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

/// Marks an inbound message as an edit of a previously sent one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditMarker {
    /// Unix timestamp of the edit.
    pub edit_date: i64,
}

/// A message received from one subscriber.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: ChatId,
    pub text: Option<String>,
    /// File id of the first photo size variant.
    pub photo: Option<String>,
    pub caption: Option<String>,
    pub message_id: Option<MessageId>,
    pub edit: Option<EditMarker>,
}

impl InboundMessage {
    pub fn text(sender: ChatId, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.edit.is_some()
    }
}

/// Acknowledgement of one outbound call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ack {
    pub chat_id: ChatId,
    pub message_id: Option<MessageId>,
}
