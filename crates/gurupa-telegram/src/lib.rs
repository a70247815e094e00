//! Telegram adapter (teloxide).
//!
//! Implements the `gurupa-core` transport port over the Telegram Bot API and
//! runs the update dispatcher.

use async_trait::async_trait;

use teloxide::{prelude::*, types::InputFile};

use tokio::time::sleep;
use tracing::debug;

pub mod handlers;
pub mod router;

use gurupa_core::{
    domain::{Ack, ChatId, MessageId},
    errors::Error,
    payload::{Method, OutboundPayload},
    ports::TransportPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(chat_id: ChatId, e: teloxide::RequestError) -> Error {
        Error::Transport {
            chat_id,
            reason: format!("telegram error: {e}"),
        }
    }

    fn missing(chat_id: ChatId, method: Method, field: &str) -> Error {
        Error::Transport {
            chat_id,
            reason: format!("{method} needs a {field}"),
        }
    }

    /// Run a request, honouring a single `RetryAfter` from Telegram.
    async fn with_retry<T, Fut>(&self, chat_id: ChatId, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        debug!(%chat_id, "telegram asked to retry after {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(chat_id, other)),
                },
            }
        }
    }
}

#[async_trait]
impl TransportPort for TelegramTransport {
    async fn send_to(&self, payload: &OutboundPayload, chat_id: ChatId) -> Result<Ack> {
        let chat = Self::tg_chat(chat_id);
        let method = payload.method;
        let target = || {
            payload
                .message_id
                .map(Self::tg_msg_id)
                .ok_or_else(|| Self::missing(chat_id, method, "message_id"))
        };

        let sent = match method {
            Method::SendMessage => {
                let text = payload.text.clone().unwrap_or_default();
                self.with_retry(chat_id, || self.bot.send_message(chat, text.clone()))
                    .await?
            }
            Method::SendPhoto => {
                let photo = payload
                    .photo
                    .clone()
                    .ok_or_else(|| Self::missing(chat_id, method, "photo"))?;
                self.with_retry(chat_id, || {
                    let mut req = self.bot.send_photo(chat, InputFile::file_id(photo.clone()));
                    if let Some(c) = &payload.caption {
                        req = req.caption(c.clone());
                    }
                    req
                })
                .await?
            }
            Method::EditMessageText => {
                let message_id = target()?;
                let text = payload.text.clone().unwrap_or_default();
                self.with_retry(chat_id, || {
                    self.bot.edit_message_text(chat, message_id, text.clone())
                })
                .await?
            }
            Method::EditMessageCaption => {
                // The photo itself cannot change through this call; only the caption.
                let message_id = target()?;
                self.with_retry(chat_id, || {
                    let mut req = self.bot.edit_message_caption(chat, message_id);
                    if let Some(c) = &payload.caption {
                        req = req.caption(c.clone());
                    }
                    req
                })
                .await?
            }
        };

        debug!(%chat_id, %method, "message sent");
        Ok(Ack {
            chat_id,
            message_id: Some(MessageId(sent.id.0)),
        })
    }
}
