use crate::{config::CommandTokens, domain::InboundMessage, payload::Content};

/// What an inbound message asks the bot to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Join,
    Leave,
    Help,
    /// Echo the full text back to the sender only.
    Debug(String),
    /// Relay this content to everyone else.
    Forward(Content),
}

impl Intent {
    /// Classify a message. Commands are matched on the exact text; the debug
    /// prefix only needs to start it. Anything else is forwarded.
    pub fn classify(message: &InboundMessage, commands: &CommandTokens) -> Self {
        let Some(text) = message.text.as_deref() else {
            return Intent::Forward(Content::of(message));
        };

        if text == commands.join {
            Intent::Join
        } else if text == commands.leave {
            Intent::Leave
        } else if text == commands.help {
            Intent::Help
        } else if text.starts_with(&commands.debug_prefix) {
            Intent::Debug(text.to_string())
        } else {
            Intent::Forward(Content::Text(text.to_string()))
        }
    }
}
