use std::fmt;

use serde::Serialize;

use crate::domain::{InboundMessage, MessageId};

/// Bot API method an outbound payload is sent with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    SendMessage,
    SendPhoto,
    EditMessageText,
    EditMessageCaption,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::SendMessage => "sendMessage",
            Method::SendPhoto => "sendPhoto",
            Method::EditMessageText => "editMessageText",
            Method::EditMessageCaption => "editMessageCaption",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a forwarded message carries, classified once by the router.
///
/// Text wins over a photo, since a platform message is one or the other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Photo {
        photo: String,
        caption: Option<String>,
    },
    /// Neither text nor photo. Still relayed, with identifiers only.
    Empty,
}

impl Content {
    pub fn of(message: &InboundMessage) -> Self {
        match (&message.text, &message.photo) {
            (Some(text), _) => Content::Text(text.clone()),
            (None, Some(photo)) => Content::Photo {
                photo: photo.clone(),
                caption: message.caption.clone(),
            },
            (None, None) => Content::Empty,
        }
    }
}

/// One outbound call, minus the target chat.
///
/// Serializes to the Bot API parameter object; absent fields are omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundPayload {
    #[serde(skip)]
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

impl OutboundPayload {
    /// Plain `sendMessage` with the given text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            method: Method::SendMessage,
            text: Some(text.into()),
            caption: None,
            photo: None,
            message_id: None,
        }
    }

    /// Build the payload relayed to other subscribers: `content` signed with
    /// `nickname`, sent new or as an edit depending on `message`, which also
    /// supplies the message id forwarded unchanged.
    pub fn relay_of(content: &Content, message: &InboundMessage, nickname: &str) -> Self {
        let edit = message.is_edit();
        let signed = |body: &str| format!("{nickname}: {body}");

        let (method, text, caption, photo) = match content {
            Content::Text(text) => {
                let method = if edit {
                    Method::EditMessageText
                } else {
                    Method::SendMessage
                };
                (method, Some(signed(text.as_str())), None, None)
            }
            Content::Photo { photo, caption } => {
                let method = if edit {
                    Method::EditMessageCaption
                } else {
                    Method::SendPhoto
                };
                let caption = caption.as_deref().map(signed);
                (method, None, caption, Some(photo.clone()))
            }
            Content::Empty => {
                let method = if edit {
                    Method::EditMessageText
                } else {
                    Method::SendMessage
                };
                (method, None, None, None)
            }
        };

        Self {
            method,
            text,
            caption,
            photo,
            message_id: message.message_id,
        }
    }
}
