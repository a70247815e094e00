use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    config::{BotTexts, CommandTokens, Config},
    domain::{ChatId, InboundMessage},
    intent::Intent,
    nickname::assign_nickname,
    payload::OutboundPayload,
    ports::{Clock, RegistryPort, SystemClock, TransportPort},
    Result,
};

pub const SUBSCRIBED: &str = "subscribed a new user";
pub const UNSUBSCRIBED: &str = "unsubscribed one user";
pub const HELP_SENT: &str = "sent the help to the user";
pub const DEBUG_SENT: &str = "sent the debug to the user";
pub const FORWARDED: &str = "forwarded the message to the group";

/// Success descriptor returned to whatever wraps the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }
}

/// The relay application: one instance per process, one `handle` per event.
///
/// Collaborators are injected; nothing here survives between invocations
/// except what the registry stores.
pub struct Relay {
    pub(crate) registry: Arc<dyn RegistryPort>,
    pub(crate) transport: Arc<dyn TransportPort>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) nicknames: Vec<String>,
    pub(crate) commands: CommandTokens,
    pub(crate) texts: BotTexts,
}

impl Relay {
    pub fn new(
        cfg: &Config,
        registry: Arc<dyn RegistryPort>,
        transport: Arc<dyn TransportPort>,
    ) -> Self {
        Self {
            registry,
            transport,
            clock: Arc::new(SystemClock),
            nicknames: cfg.nicknames.clone(),
            commands: cfg.commands.clone(),
            texts: cfg.texts.clone(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn handle(&self, message: &InboundMessage) -> Result<Response> {
        let intent = Intent::classify(message, &self.commands);
        debug!(sender = %message.sender, ?intent, edit = message.is_edit(), "inbound message");

        match intent {
            Intent::Join => self.subscribe(message.sender).await,
            Intent::Leave => self.unsubscribe(message.sender).await,
            Intent::Help => self.help(message.sender).await,
            Intent::Debug(text) => self.debug_echo(message.sender, &text).await,
            Intent::Forward(content) => {
                self.forward_content(message, &content).await?;
                Ok(Response::ok(FORWARDED))
            }
        }
    }

    async fn subscribe(&self, chat_id: ChatId) -> Result<Response> {
        self.registry.add(chat_id).await.inspect_err(|e| {
            error!(%chat_id, "unable to register the chat id: {e}");
        })?;
        info!(%chat_id, "chat subscribed");

        self.reply(chat_id, &self.texts.greetings).await?;
        self.reply(chat_id, &self.texts.help).await?;

        Ok(Response::ok(SUBSCRIBED))
    }

    async fn unsubscribe(&self, chat_id: ChatId) -> Result<Response> {
        self.registry.remove(chat_id).await.inspect_err(|e| {
            error!(%chat_id, "unable to delete the chat id: {e}");
        })?;
        info!(%chat_id, "chat unsubscribed");

        self.reply(chat_id, &self.texts.farewell).await?;

        Ok(Response::ok(UNSUBSCRIBED))
    }

    async fn help(&self, chat_id: ChatId) -> Result<Response> {
        self.reply(chat_id, &self.texts.help).await?;
        Ok(Response::ok(HELP_SENT))
    }

    /// Echo back to the sender alone. No registry read, so the nickname is
    /// computed as if the sender were the only subscriber.
    async fn debug_echo(&self, chat_id: ChatId, text: &str) -> Result<Response> {
        let nickname = assign_nickname(&[chat_id], chat_id, &self.nicknames, self.clock.now())?;
        self.reply(chat_id, &format!("{nickname}: {text}")).await?;
        Ok(Response::ok(DEBUG_SENT))
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.transport
            .send_to(&OutboundPayload::text(text), chat_id)
            .await?;
        Ok(())
    }
}
