//! Hexagonal ports for the relay's collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{Ack, ChatId},
    payload::OutboundPayload,
    Result,
};

/// Durable set of subscribed chats.
///
/// `add` and `remove` are idempotent. `list` returns the roster in whatever
/// order the store keeps it.
#[async_trait]
pub trait RegistryPort: Send + Sync {
    async fn list(&self) -> Result<Vec<ChatId>>;
    async fn add(&self, chat_id: ChatId) -> Result<()>;
    async fn remove(&self, chat_id: ChatId) -> Result<()>;
}

/// Outbound calls to the chat platform.
///
/// Implementations own any retry policy; the relay never retries.
#[async_trait]
pub trait TransportPort: Send + Sync {
    async fn send_to(&self, payload: &OutboundPayload, chat_id: ChatId) -> Result<Ack>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
