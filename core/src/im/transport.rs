//! IM transport abstraction: "reply to a message with a card" and "who am I" for the webhook and workers.
//! Each channel declares its capabilities; the dispatcher truncates replies to fit them.

use async_trait::async_trait;

use super::card::ReplyCard;
use super::identity::BotIdentity;
use crate::error::RelayError;

/// Default markdown budget for one reply card (characters).
pub const DEFAULT_MAX_CARD_LEN: usize = 8000;

#[derive(Clone, Debug)]
pub struct ImChannelCapabilities {
    /// Max characters of markdown in a single reply card.
    pub max_card_len: usize,
    /// Channel name for logging (e.g. "feishu").
    pub channel: &'static str,
}

/// Transport that can reply to an inbound message and report the bot's own identity.
#[async_trait]
pub trait ImTransport: Send + Sync {
    fn capabilities(&self) -> ImChannelCapabilities {
        ImChannelCapabilities {
            max_card_len: DEFAULT_MAX_CARD_LEN,
            channel: "im",
        }
    }

    /// Reply to `message_id` with `card`. Caller truncates to capabilities().max_card_len.
    async fn reply_card(&self, message_id: &str, card: &ReplyCard) -> Result<(), RelayError>;

    /// Look up the bot's own identity (open_id).
    async fn bot_identity(&self) -> Result<BotIdentity, RelayError>;
}

/// Cut `text` to at most `max_chars` characters, appending an ellipsis marker when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
    }
}
