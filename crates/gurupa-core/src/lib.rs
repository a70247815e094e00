//! Core domain + application logic for the Gurupa relay bot.
//!
//! This crate is framework-agnostic. The chat platform transport and the
//! subscriber registry live behind ports (traits); the Telegram adapter lives
//! in `gurupa-telegram`.

pub mod config;
pub mod domain;
pub mod errors;
pub mod forward;
pub mod intent;
pub mod logging;
pub mod nickname;
pub mod payload;
pub mod ports;
pub mod registry;
pub mod relay;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
pub use relay::{Relay, Response};
