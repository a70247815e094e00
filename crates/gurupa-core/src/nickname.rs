//! Daily rotating nicknames.
//!
//! A sender's nickname is a pure function of the UTC day, the sender's
//! position in the roster read for this invocation and the nickname table.
//! Nothing is persisted per chat.
//!
//! Known limitation: the spread is a heuristic. Two chats can share a
//! nickname on the same day when the table is shorter than the roster, and
//! the mapping shifts whenever the registry returns the roster in a
//! different order.

use chrono::{DateTime, Utc};

use crate::{domain::ChatId, errors::Error, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed since the Unix epoch (floored, also before 1970).
pub fn days_since_epoch(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(SECONDS_PER_DAY)
}

/// Table index for roster position `chat_index` on day `days`.
///
/// Multiplying by `count + 1` before the modulus spreads neighbouring roster
/// positions over the table.
pub fn nickname_index(days: i64, chat_index: usize, count: usize) -> usize {
    let count = count as i128;
    let spread = (days as i128 + chat_index as i128) * (count + 1);
    spread.rem_euclid(count) as usize
}

/// Pick the nickname for `chat_id` given the roster read for this call.
pub fn assign_nickname<'a>(
    roster: &[ChatId],
    chat_id: ChatId,
    nicknames: &'a [String],
    now: DateTime<Utc>,
) -> Result<&'a str> {
    if nicknames.is_empty() {
        return Err(Error::Config("nickname table is empty".to_string()));
    }
    let chat_index = roster
        .iter()
        .position(|c| *c == chat_id)
        .ok_or(Error::NotFound(chat_id))?;

    let index = nickname_index(days_since_epoch(now), chat_index, nicknames.len());
    Ok(&nicknames[index])
}
