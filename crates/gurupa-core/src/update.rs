//! Decoding of raw Bot API webhook updates.

use serde::Deserialize;

use crate::{
    domain::{ChatId, EditMarker, InboundMessage, MessageId},
    errors::Error,
    relay::{Relay, Response},
    Result,
};

/// The subset of a Bot API `Update` the relay reads.
#[derive(Clone, Debug, Deserialize)]
pub struct WireUpdate {
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub edited_message: Option<WireMessage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireMessage {
    pub chat: WireChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<WirePhotoSize>>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub message_id: Option<i32>,
    #[serde(default)]
    pub edit_date: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireChat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WirePhotoSize {
    pub file_id: String,
}

impl From<WireMessage> for InboundMessage {
    fn from(m: WireMessage) -> Self {
        Self {
            sender: ChatId(m.chat.id),
            text: m.text,
            photo: m
                .photo
                .and_then(|sizes| sizes.into_iter().next())
                .map(|p| p.file_id),
            caption: m.caption,
            message_id: m.message_id.map(MessageId),
            edit: m.edit_date.map(|edit_date| EditMarker { edit_date }),
        }
    }
}

/// Parse an update body into the message it carries.
///
/// `message` wins over `edited_message` when both are present.
pub fn parse_update(body: &str) -> Result<InboundMessage> {
    let update: WireUpdate = serde_json::from_str(body)?;
    update
        .message
        .or(update.edited_message)
        .map(InboundMessage::from)
        .ok_or_else(|| Error::InvalidEvent("update carries no message".to_string()))
}

/// One stateless invocation: decode the update and run it through the relay.
pub async fn handle_event(relay: &Relay, body: &str) -> Result<Response> {
    let message = parse_update(body)?;
    relay.handle(&message).await
}
