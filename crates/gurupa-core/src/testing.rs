//! Port fakes shared by the unit tests.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    config::{BotTexts, CommandTokens, Config},
    domain::{Ack, ChatId},
    errors::Error,
    payload::OutboundPayload,
    ports::{Clock, RegistryPort, TransportPort},
    relay::Relay,
    Result,
};

/// Nickname table paired with `FixedClock`: on that day roster position `p`
/// maps to `FIXED_DAY_NICKNAMES[p]`.
pub const FIXED_DAY_NICKNAMES: [&str; 5] = ["Aster", "Birch", "Cedar", "Dahlia", "Elm"];

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2024-01-03 10:00 UTC, day 19_725 since the epoch (a multiple of 5).
    pub fn day_19725() -> Self {
        Self(Utc.timestamp_opt(19_725 * 86_400 + 36_000, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    roster: Mutex<Vec<ChatId>>,
    failing: bool,
}

impl FakeRegistry {
    pub fn with(ids: &[i64]) -> Self {
        Self {
            roster: Mutex::new(ids.iter().copied().map(ChatId).collect()),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Vec<ChatId> {
        self.roster.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(Error::Registry("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryPort for FakeRegistry {
    async fn list(&self) -> Result<Vec<ChatId>> {
        self.check()?;
        Ok(self.snapshot())
    }

    async fn add(&self, chat_id: ChatId) -> Result<()> {
        self.check()?;
        let mut roster = self.roster.lock().unwrap();
        if !roster.contains(&chat_id) {
            roster.push(chat_id);
        }
        Ok(())
    }

    async fn remove(&self, chat_id: ChatId) -> Result<()> {
        self.check()?;
        self.roster.lock().unwrap().retain(|c| *c != chat_id);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Call {
    pub chat_id: ChatId,
    pub payload: OutboundPayload,
}

/// Records every call; fails the ones aimed at `failing` chats.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    failing: HashSet<i64>,
}

impl FakeTransport {
    pub fn failing_for(ids: &[i64]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Calls in the order they reached the transport.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls ordered by target chat (fan-out order is not deterministic).
    pub fn calls_sorted(&self) -> Vec<Call> {
        let mut calls = self.calls();
        calls.sort_by_key(|c| c.chat_id);
        calls
    }
}

#[async_trait]
impl TransportPort for FakeTransport {
    async fn send_to(&self, payload: &OutboundPayload, chat_id: ChatId) -> Result<Ack> {
        self.calls.lock().unwrap().push(Call {
            chat_id,
            payload: payload.clone(),
        });
        if self.failing.contains(&chat_id.0) {
            return Err(Error::Transport {
                chat_id,
                reason: "simulated failure".to_string(),
            });
        }
        Ok(Ack {
            chat_id,
            message_id: None,
        })
    }
}

/// Bot API parameter object a payload serializes to.
pub fn payload_json(payload: &OutboundPayload) -> serde_json::Value {
    serde_json::to_value(payload).unwrap()
}

pub fn test_config() -> Config {
    Config {
        telegram_bot_token: "x".to_string(),
        registry_path: "/tmp/gurupa-test-registry.json".into(),
        nicknames: FIXED_DAY_NICKNAMES.iter().map(|s| s.to_string()).collect(),
        commands: CommandTokens::default(),
        texts: BotTexts {
            greetings: "greetings text".to_string(),
            help: "help text".to_string(),
            farewell: "farewell text".to_string(),
        },
        webhook: None,
    }
}

pub fn relay_with(registry: Arc<FakeRegistry>, transport: Arc<FakeTransport>) -> Relay {
    Relay::new(&test_config(), registry, transport).with_clock(Arc::new(FixedClock::day_19725()))
}
