//! Telegram update handlers.
//!
//! Both new and edited messages are converted into the core `InboundMessage`
//! and handed to the relay. Errors stop here so the dispatcher keeps running.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::{debug, error};

use gurupa_core::domain::{ChatId, EditMarker, InboundMessage, MessageId};

use crate::router::AppState;

pub fn inbound_from_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        sender: ChatId(msg.chat.id.0),
        text: msg.text().map(str::to_string),
        photo: msg
            .photo()
            .and_then(|sizes| sizes.first())
            .map(|p| p.file.id.clone()),
        caption: msg.caption().map(str::to_string),
        message_id: Some(MessageId(msg.id.0)),
        edit: msg.edit_date().map(|d| EditMarker {
            edit_date: d.timestamp(),
        }),
    }
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let inbound = inbound_from_message(&msg);
    match state.relay.handle(&inbound).await {
        Ok(resp) => {
            debug!(chat_id = %inbound.sender, status = resp.status_code, "{}", resp.body);
        }
        Err(e) => {
            error!(chat_id = %inbound.sender, "failed to handle message: {e}");
        }
    }
    Ok(())
}
